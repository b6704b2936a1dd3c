// Project status tools backed by the immutable project table

use crate::tools::{ParameterKind, ParameterSpec, ToolArguments, ToolDescriptor, ToolHandler};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracker_core::catalog::ProjectMap;
use tracker_core::ProjectTable;

pub const GET_PROJECT: &str = "get_project";
pub const LIST_PROJECTS: &str = "list_projects";
pub const GET_TOTAL_COST: &str = "get_total_cost";
pub const SEARCH_BY_STATUS: &str = "search_by_status";

/// Descriptors for every project tool, in advertised order
pub fn project_tools(table: Arc<ProjectTable>) -> Vec<ToolDescriptor> {
    let ids = table
        .ids()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        ToolDescriptor::new(
            GET_PROJECT,
            format!(
                "Get the current status and details of a project by its ID. Available project IDs: {}",
                ids
            ),
            GetProjectTool::new(table.clone()),
        )
        .with_parameter(ParameterSpec::required(
            "project_id",
            ParameterKind::String,
            "The project ID to look up (case-insensitive)",
        )),
        ToolDescriptor::new(
            LIST_PROJECTS,
            "List all projects in the Jamiat IT Department with their current status.",
            ListProjectsTool::new(table.clone()),
        ),
        ToolDescriptor::new(
            GET_TOTAL_COST,
            "Calculate the total monthly hosting cost across all projects.",
            TotalCostTool::new(table.clone()),
        ),
        ToolDescriptor::new(
            SEARCH_BY_STATUS,
            "Find all projects with a specific website and/or dashboard status. \
             Valid statuses: live, development. You can filter by website_status, \
             dashboard_status, or both.",
            SearchByStatusTool::new(table),
        )
        .with_parameter(ParameterSpec::optional(
            "website_status",
            ParameterKind::String,
            "Website status to match (live, development)",
        ))
        .with_parameter(ParameterSpec::optional(
            "dashboard_status",
            ParameterKind::String,
            "Dashboard status to match (live, development)",
        )),
    ]
}

/// Tool to get a single project
pub struct GetProjectTool {
    table: Arc<ProjectTable>,
}

impl GetProjectTool {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl ToolHandler for GetProjectTool {
    async fn call(&self, arguments: &ToolArguments) -> Result<String> {
        let project_id = arguments.require("project_id")?;

        match self.table.get(project_id) {
            Some(project) => serde_json::to_string_pretty(project)
                .context("Failed to serialize project"),
            None => {
                let available = self
                    .table
                    .ids()
                    .map(|id| id.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!(
                    "Project '{}' not found. Available: [{}]",
                    project_id, available
                ))
            }
        }
    }
}

/// Tool to list every project on one line each
pub struct ListProjectsTool {
    table: Arc<ProjectTable>,
}

impl ListProjectsTool {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl ToolHandler for ListProjectsTool {
    async fn call(&self, _arguments: &ToolArguments) -> Result<String> {
        let lines: Vec<String> = self
            .table
            .iter()
            .map(|p| {
                format!(
                    "• {} ({}) - {} - {} - {} - {}",
                    p.name, p.id, p.website_status, p.dashboard_status, p.platform, p.cost
                )
            })
            .collect();
        Ok(lines.join("\n"))
    }
}

/// Tool to sum monthly hosting costs
pub struct TotalCostTool {
    table: Arc<ProjectTable>,
}

impl TotalCostTool {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl ToolHandler for TotalCostTool {
    async fn call(&self, _arguments: &ToolArguments) -> Result<String> {
        let breakdown = self.table.cost_breakdown()?;

        let mut out = String::from("Monthly Hosting Breakdown:\n");
        let lines: Vec<String> = breakdown
            .lines
            .iter()
            .map(|(project, _)| format!("  {}: {}", project.name, project.cost))
            .collect();
        out.push_str(&lines.join("\n"));
        out.push_str(&format!("\n\nTotal: {}/mo", breakdown.total));
        Ok(out)
    }
}

/// Tool to filter projects by website and dashboard status
pub struct SearchByStatusTool {
    table: Arc<ProjectTable>,
}

impl SearchByStatusTool {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }
}

#[async_trait::async_trait]
impl ToolHandler for SearchByStatusTool {
    async fn call(&self, arguments: &ToolArguments) -> Result<String> {
        let website = arguments.get("website_status");
        let dashboard = arguments.get("dashboard_status");

        let matches = self.table.search(website, dashboard);
        if matches.is_empty() {
            return Ok(format!(
                "No projects found with website_status='{}', dashboard_status='{}'",
                website.unwrap_or("any"),
                dashboard.unwrap_or("any")
            ));
        }

        ProjectMap::new(matches)
            .to_json_pretty()
            .context("Failed to serialize search results")
    }
}
