// Read-only resources exposing the project table

use crate::protocol::{ResourceContents, ResourceDefinition};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracker_core::ProjectTable;

pub const ALL_PROJECTS_URI: &str = "tracker://projects/all";

/// Resources backed by the project table
pub struct ProjectResources {
    table: Arc<ProjectTable>,
}

impl ProjectResources {
    pub fn new(table: Arc<ProjectTable>) -> Self {
        Self { table }
    }

    pub fn list(&self) -> Vec<ResourceDefinition> {
        vec![ResourceDefinition {
            uri: ALL_PROJECTS_URI.to_string(),
            name: "all_projects".to_string(),
            description: Some("Complete project database as JSON.".to_string()),
            mime_type: Some("application/json".to_string()),
        }]
    }

    /// Contents for a URI, or `None` if the URI is not served here
    pub fn read(&self, uri: &str) -> Result<Option<ResourceContents>> {
        if uri != ALL_PROJECTS_URI {
            return Ok(None);
        }

        let text = self
            .table
            .to_json_pretty()
            .context("Failed to serialize project table")?;

        Ok(Some(ResourceContents {
            uri: uri.to_string(),
            mime_type: Some("application/json".to_string()),
            text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_projects() {
        let resources = ProjectResources::new(Arc::new(ProjectTable::builtin()));
        let contents = resources.read(ALL_PROJECTS_URI).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(parsed.as_object().unwrap().len(), 5);
        assert_eq!(parsed["hamqadam"]["cost"], "$45/mo");
    }

    #[test]
    fn test_unknown_uri() {
        let resources = ProjectResources::new(Arc::new(ProjectTable::builtin()));
        assert!(resources.read("tracker://projects/none").unwrap().is_none());
        assert_eq!(resources.list().len(), 1);
    }
}
