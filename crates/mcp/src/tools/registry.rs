// Tool descriptors and the registry that owns them

use crate::error::ToolError;
use crate::protocol::ToolSchema;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::dispatcher::ToolArguments;

/// Tool executor trait
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool against already coerced arguments
    async fn call(&self, arguments: &ToolArguments) -> Result<String>;
}

#[async_trait::async_trait]
impl<F> ToolHandler for F
where
    F: Fn(&ToolArguments) -> Result<String> + Send + Sync,
{
    async fn call(&self, arguments: &ToolArguments) -> Result<String> {
        self(arguments)
    }
}

/// Accepted shape of a single argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterKind {
    String,
    /// One of a fixed set of values, matched case-insensitively
    Enum(Vec<String>),
}

impl ParameterKind {
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Human readable description used in type errors
    pub fn expected(&self) -> String {
        match self {
            Self::String => "a string".to_string(),
            Self::Enum(values) => format!("one of: {}", values.join(", ")),
        }
    }
}

/// Declared parameter of a tool
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub description: String,
    pub kind: ParameterKind,
    pub required: bool,
    /// Value substituted when an optional argument is absent.
    /// `None` means "no constraint".
    pub default: Option<String>,
}

impl ParameterSpec {
    pub fn required(
        name: impl Into<String>,
        kind: ParameterKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        kind: ParameterKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn json_schema(&self) -> serde_json::Value {
        let mut schema = match &self.kind {
            ParameterKind::String => json_schema_string(&self.description),
            ParameterKind::Enum(values) => json_schema_enum(values, &self.description),
        };
        if let Some(default) = &self.default {
            schema["default"] = serde_json::Value::String(default.clone());
        }
        schema
    }
}

/// Registered metadata and handler for one tool
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Get the tool schema for MCP
    pub fn schema(&self) -> ToolSchema {
        let mut properties = serde_json::Map::new();
        for parameter in &self.parameters {
            properties.insert(parameter.name.clone(), parameter.json_schema());
        }
        let required = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: json_schema_object(serde_json::Value::Object(properties), required),
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Tool registry for managing available tools.
///
/// Keeps registration order for discovery. Populated at startup and
/// read-only once handed to a dispatcher.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Register a tool
    pub fn register(&mut self, descriptor: ToolDescriptor) -> Result<(), ToolError> {
        if self.index.contains_key(&descriptor.name) {
            return Err(ToolError::DuplicateOperation(descriptor.name));
        }
        tracing::debug!(tool = %descriptor.name, "Registered tool");
        self.index.insert(descriptor.name.clone(), self.tools.len());
        self.tools.push(descriptor);
        Ok(())
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Result<&ToolDescriptor, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownOperation(name.to_string()))
    }

    /// All tools in registration order
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// List all tool schemas
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(ToolDescriptor::schema).collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Accumulates descriptors before the registry is frozen into a dispatcher
#[derive(Debug, Default)]
pub struct ToolRegistryBuilder {
    tools: Vec<ToolDescriptor>,
}

impl ToolRegistryBuilder {
    pub fn tool(mut self, descriptor: ToolDescriptor) -> Self {
        self.tools.push(descriptor);
        self
    }

    pub fn tools(mut self, descriptors: impl IntoIterator<Item = ToolDescriptor>) -> Self {
        self.tools.extend(descriptors);
        self
    }

    /// Fails on the first duplicate name
    pub fn build(self) -> Result<ToolRegistry, ToolError> {
        let mut registry = ToolRegistry::new();
        for descriptor in self.tools {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_enum(values: &[String], description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "enum": values,
        "description": description
    })
}
