// Tool invocation: argument coercion and handler execution

use crate::error::ToolError;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracker_core::DataIntegrityError;

use super::registry::{ParameterKind, ParameterSpec, ToolDescriptor, ToolRegistry};

/// Arguments after coercion against a tool's parameter list.
///
/// Every declared parameter has an entry; `None` marks an absent optional
/// argument with no default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolArguments {
    values: HashMap<String, Option<String>>,
}

impl ToolArguments {
    /// Value of an argument, or `None` when it was absent
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    /// Value of an argument the handler cannot run without
    pub fn require(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)
            .ok_or_else(|| anyhow::anyhow!("argument '{}' was not supplied", name))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.values.insert(name.into(), value);
    }
}

/// Resolves tools by name and runs them.
///
/// Holds the registry behind an `Arc` and never mutates it, so `invoke`
/// can be called from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Invoke a tool by name with raw JSON arguments
    pub async fn invoke(&self, name: &str, args: &Map<String, Value>) -> Result<String, ToolError> {
        let descriptor = self.registry.lookup(name)?;
        let arguments = coerce_arguments(descriptor, args)?;

        tracing::debug!(tool = %name, "Invoking tool");

        let outcome = AssertUnwindSafe(descriptor.handler().call(&arguments))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(err)) => {
                let err = match err.downcast::<DataIntegrityError>() {
                    Ok(source) => ToolError::DataIntegrity {
                        operation: name.to_string(),
                        source,
                    },
                    Err(err) => ToolError::HandlerExecution {
                        operation: name.to_string(),
                        source: err.into(),
                    },
                };
                tracing::warn!(tool = %name, error = %err, "Tool failed");
                Err(err)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %name, panic = %message, "Tool panicked");
                Err(ToolError::HandlerExecution {
                    operation: name.to_string(),
                    source: format!("handler panicked: {}", message).into(),
                })
            }
        }
    }
}

/// Check and convert raw arguments against the declared parameters
pub fn coerce_arguments(
    descriptor: &ToolDescriptor,
    args: &Map<String, Value>,
) -> Result<ToolArguments, ToolError> {
    let mut arguments = ToolArguments::default();

    for parameter in &descriptor.parameters {
        let value = match args.get(&parameter.name) {
            Some(Value::Null) | None => {
                if parameter.required {
                    return Err(ToolError::MissingArgument {
                        operation: descriptor.name.clone(),
                        parameter: parameter.name.clone(),
                    });
                }
                parameter.default.clone()
            }
            Some(raw) => Some(coerce_value(descriptor, parameter, raw)?),
        };
        arguments.insert(parameter.name.clone(), value);
    }

    for extra in args
        .keys()
        .filter(|k| !descriptor.parameters.iter().any(|p| &p.name == *k))
    {
        tracing::debug!(tool = %descriptor.name, argument = %extra, "Ignoring undeclared argument");
    }

    Ok(arguments)
}

fn coerce_value(
    descriptor: &ToolDescriptor,
    parameter: &ParameterSpec,
    raw: &Value,
) -> Result<String, ToolError> {
    let type_error = || ToolError::ArgumentType {
        operation: descriptor.name.clone(),
        parameter: parameter.name.clone(),
        expected: parameter.kind.expected(),
    };

    let text = match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return Err(type_error()),
    };

    match &parameter.kind {
        ParameterKind::String => Ok(text),
        ParameterKind::Enum(allowed) => allowed
            .iter()
            .find(|v| v.eq_ignore_ascii_case(text.trim()))
            .cloned()
            .ok_or_else(type_error),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
