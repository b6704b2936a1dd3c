// Error types for the project catalog

use crate::types::ProjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or loading a project table
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("duplicate project id: {0}")]
    DuplicateProject(ProjectId),

    #[error("project id must not be empty")]
    EmptyProjectId,

    #[error("failed to read catalog file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// A stored cost string that cannot be parsed into an amount
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("project '{project_id}' has a malformed cost: {value:?}")]
pub struct DataIntegrityError {
    pub project_id: ProjectId,
    pub value: String,
}
