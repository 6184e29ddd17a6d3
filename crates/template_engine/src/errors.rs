use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types that can occur while expanding templates.
///
/// Template failures surface to the user as configuration problems, so every
/// variant carries enough context (the offending path or the engine message)
/// to point at the bad input.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template compilation failed due to syntax errors.
    ///
    /// This error occurs when the template contains invalid syntax, such as
    /// unclosed sections or malformed expressions.
    #[error("Template compilation failed: {message}")]
    Compilation {
        /// Detailed error message from the parser
        message: String,
    },

    /// A syntactically valid template failed while rendering.
    #[error("Template rendering failed: {message}")]
    Render {
        /// Detailed error message from the renderer
        message: String,
    },

    /// Template content exceeded the configured size limit.
    #[error("Resource limit exceeded: {limit_type} - {message}")]
    ResourceLimit {
        /// Type of resource limit that was exceeded
        limit_type: String,
        /// Detailed message about the limit violation
        message: String,
    },

    /// A template file referenced by configuration does not exist.
    #[error("Template file not found: {path}")]
    FileNotFound { path: String },

    /// A template file exists but could not be read as UTF-8 text.
    #[error("Template file could not be read: {path} - {reason}")]
    FileUnreadable { path: String, reason: String },
}
