//! Scaffolder: built-in multi-file project templates and their materialization (§4.9).

pub mod registry;
pub mod scaffolder;

pub use registry::{get_template, list_templates, templates_for_language, Template, TemplateMetadata};
pub use scaffolder::{ScaffoldError, ScaffoldResult, Scaffolder};
