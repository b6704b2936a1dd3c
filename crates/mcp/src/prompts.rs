// Prompt templates that interpolate the project table

use crate::protocol::{GetPromptResult, PromptDefinition, PromptMessage, ToolContent};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracker_core::ProjectTable;

pub const MONTHLY_REPORT: &str = "monthly_report";

/// Prompt templates backed by the project table
pub struct ProjectPrompts {
    table: Arc<ProjectTable>,
}

impl ProjectPrompts {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }

    pub fn list(&self) -> Vec<PromptDefinition> {
        vec![PromptDefinition {
            name: MONTHLY_REPORT.to_string(),
            description: Some("Generate a monthly IT department status report.".to_string()),
            arguments: Vec::new(),
        }]
    }

    /// Render a prompt, or `None` for an unknown name
    pub fn get(&self, name: &str) -> Result<Option<GetPromptResult>> {
        if name != MONTHLY_REPORT {
            return Ok(None);
        }

        let data = self
            .table
            .to_json_pretty()
            .context("Failed to serialize project table")?;

        let text = format!(
            "You are the IT Department Manager at Jamiat.\n\
             Generate a professional monthly status report based on this project data:\n\
             {}\n\n\
             Include: Executive summary, per-project updates, hosting costs, and next month's priorities.\n\
             Keep it concise and professional.",
            data
        );

        Ok(Some(GetPromptResult {
            description: Some("Generate a monthly IT department status report.".to_string()),
            messages: vec![PromptMessage {
                role: "user".to_string(),
                content: ToolContent::text(text),
            }],
        }))
    }
}
