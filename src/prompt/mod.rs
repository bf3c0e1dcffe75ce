//! Prompt templates and the registry that names them.

pub mod registry;
pub mod template;

pub use registry::{TemplateRegistry, DEFAULT_TEMPLATE};
pub use template::TemplateError;
