//! Template engine for relkit.
//!
//! Expands Mustache-style `{{placeholder}}` templates used throughout release
//! configuration (archive names, tag names, announcement messages, URLs).

mod errors;
pub mod handlebars_engine;

pub use errors::TemplateError;
pub use handlebars_engine::{TemplateContext, TemplateEngine, TemplateRenderConfig};
