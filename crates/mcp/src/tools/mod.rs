pub mod dispatcher;
pub mod projects;
mod registry;

pub use dispatcher::{coerce_arguments, Dispatcher, ToolArguments};
pub use projects::project_tools;
pub use registry::{
    json_schema_enum, json_schema_object, json_schema_string, ParameterKind, ParameterSpec,
    ToolDescriptor, ToolHandler, ToolRegistry, ToolRegistryBuilder,
};
