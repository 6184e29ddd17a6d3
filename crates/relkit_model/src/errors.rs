//! Configuration model error types.
//!
//! Domain-specific errors for loading, merging, freezing and resolving the
//! release configuration tree.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Configuration model errors.
///
/// `Immutable` is a programming error: it means a pipeline stage tried to
/// change configuration after it was frozen. Every other variant describes a
/// problem with user-supplied configuration and is reported to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Cannot modify {entity}: entity is immutable")]
    Immutable { entity: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to parse configuration: {reason}")]
    ParseError { reason: String },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access configuration file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Template file not found: {path}")]
    TemplateFileNotFound { path: String },

    #[error("Template file could not be read: {path} - {reason}")]
    TemplateFileUnreadable { path: String, reason: String },

    #[error("Failed to resolve template: {reason}")]
    TemplateRender { reason: String },

    #[error("Only one release service may be configured, found: {services:?}")]
    MultipleReleaseServices { services: Vec<String> },
}

impl From<template_engine::TemplateError> for ConfigurationError {
    fn from(error: template_engine::TemplateError) -> Self {
        use template_engine::TemplateError;

        match error {
            TemplateError::FileNotFound { path } => ConfigurationError::TemplateFileNotFound { path },
            TemplateError::FileUnreadable { path, reason } => {
                ConfigurationError::TemplateFileUnreadable { path, reason }
            }
            other => ConfigurationError::TemplateRender {
                reason: other.to_string(),
            },
        }
    }
}

/// Result type alias for configuration operations.
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;
