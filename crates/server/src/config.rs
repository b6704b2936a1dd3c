use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracker_core::ProjectTable;
use tracker_mcp::McpServer;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenConfig {
    /// Name reported to MCP clients during the handshake
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// TOML file of `[[projects]]`; the built-in table is used when unset
    #[serde(default)]
    pub projects_file: Option<PathBuf>,
}

fn default_name() -> String {
    "jamiat-tracker".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn load(config_path: &Path) -> Result<Self> {
        // Load config file if it exists, otherwise use defaults
        if !config_path.exists() {
            tracing::info!("Configuration file not found, using defaults");
            return Ok(Self::default());
        }

        let content =
            std::fs::read_to_string(config_path).context("Failed to read configuration file")?;
        let mut config: Self =
            toml::from_str(&content).context("Failed to parse configuration file")?;

        // Relative catalog paths are resolved against the config file
        if let (Some(file), Some(dir)) = (&config.catalog.projects_file, config_path.parent()) {
            if file.is_relative() {
                config.catalog.projects_file = Some(dir.join(file));
            }
        }

        Ok(config)
    }

    /// Socket address string to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the project table this server exposes
    pub fn project_table(&self) -> Result<ProjectTable> {
        match &self.catalog.projects_file {
            Some(path) => ProjectTable::load(path).context("Failed to load project catalog"),
            None => {
                tracing::info!("No projects file configured, using built-in projects");
                Ok(ProjectTable::builtin())
            }
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mcp: Arc<McpServer>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let table = Arc::new(config.project_table()?);
        let mcp = McpServer::for_table(config.server.name.clone(), table)
            .context("Failed to register tools")?;

        Ok(Self { mcp: Arc::new(mcp) })
    }
}
