// Immutable project table

use crate::error::{CatalogError, DataIntegrityError};
use crate::types::{Money, Project, ProjectId, ProjectStatus};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::path::Path;

/// Ordered, read-only set of projects keyed by id.
///
/// Built once at startup and shared behind an `Arc`; there are no
/// mutating operations.
#[derive(Debug, Clone)]
pub struct ProjectTable {
    projects: Vec<Project>,
    index: HashMap<ProjectId, usize>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    projects: Vec<Project>,
}

impl ProjectTable {
    /// Build a table, rejecting empty or duplicate ids. Ids are lowercased.
    pub fn new(projects: Vec<Project>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(projects.len());
        let mut normalized = Vec::with_capacity(projects.len());

        for mut project in projects {
            project.id = ProjectId::new(project.id.0.trim());
            if project.id.as_str().is_empty() {
                return Err(CatalogError::EmptyProjectId);
            }
            if index.contains_key(&project.id) {
                return Err(CatalogError::DuplicateProject(project.id));
            }
            index.insert(project.id.clone(), normalized.len());
            normalized.push(project);
        }

        Ok(Self {
            projects: normalized,
            index,
        })
    }

    /// The Jamiat IT department project list
    pub fn builtin() -> Self {
        use ProjectStatus::{Development, Live};

        let projects = vec![
            Project::new("jamiat", "Jamiat", Live, Live, "Vercel", "$20/mo"),
            Project::new("sama", "SAMA", Live, Development, "Vercel", "$20/mo"),
            Project::new("safe", "SAFE", Live, Live, "Vercel", "$20/mo"),
            Project::new("next", "NEXT", Live, Development, "Vercel", "$20/mo"),
            Project::new("hamqadam", "Hamqadam", Live, Live, "Vercel + Sanity", "$45/mo"),
        ];

        let index = projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();

        Self { projects, index }
    }

    /// Load a table from a TOML file of `[[projects]]` entries
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file: CatalogFile = toml::from_str(&content).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let table = Self::new(file.projects)?;
        tracing::info!(
            path = %path.display(),
            projects = table.len(),
            "Loaded project catalog"
        );
        Ok(table)
    }

    /// Case-insensitive lookup by id. Surrounding whitespace is not ignored.
    pub fn get(&self, id: &str) -> Option<&Project> {
        let key = ProjectId::new(id);
        self.index.get(&key).map(|&i| &self.projects[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProjectId> {
        self.projects.iter().map(|p| &p.id)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Projects matching every supplied status filter, in table order.
    /// A `None` filter imposes no constraint.
    pub fn search(&self, website: Option<&str>, dashboard: Option<&str>) -> Vec<&Project> {
        self.projects
            .iter()
            .filter(|p| website.map_or(true, |w| p.website_status.matches(w)))
            .filter(|p| dashboard.map_or(true, |d| p.dashboard_status.matches(d)))
            .collect()
    }

    /// Per-project monthly costs and their sum.
    ///
    /// Fails on the first malformed cost rather than under-reporting.
    pub fn cost_breakdown(&self) -> Result<CostBreakdown<'_>, DataIntegrityError> {
        let mut lines = Vec::with_capacity(self.projects.len());
        let mut total = Money::ZERO;

        for project in &self.projects {
            let amount = project.monthly_cost()?;
            total = total.checked_add(amount).ok_or_else(|| DataIntegrityError {
                project_id: project.id.clone(),
                value: project.cost.clone(),
            })?;
            lines.push((project, amount));
        }

        Ok(CostBreakdown { lines, total })
    }

    /// Pretty JSON object of every project keyed by id
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        ProjectMap::new(self.projects.iter()).to_json_pretty()
    }
}

/// Result of summing every project's monthly cost
#[derive(Debug)]
pub struct CostBreakdown<'a> {
    pub lines: Vec<(&'a Project, Money)>,
    pub total: Money,
}

/// Serializes projects as a JSON object keyed by id, preserving table order
pub struct ProjectMap<'a> {
    projects: Vec<&'a Project>,
}

impl<'a> ProjectMap<'a> {
    pub fn new(projects: impl IntoIterator<Item = &'a Project>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for ProjectMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.projects.len()))?;
        for project in &self.projects {
            map.serialize_entry(project.id.as_str(), project)?;
        }
        map.end()
    }
}
