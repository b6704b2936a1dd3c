// Core types and data for the Jamiat project tracker

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::ProjectTable;
pub use error::{CatalogError, DataIntegrityError};
pub use types::*;
