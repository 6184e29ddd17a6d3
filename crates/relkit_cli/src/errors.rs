use relkit_model::ConfigurationError;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Errors that can occur in the relkit CLI application.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded, merged or resolved.
    ///
    /// Wraps every configuration model failure, including missing files,
    /// TOML syntax errors and invalid policy values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments were provided.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The resolved configuration could not be written as JSON.
    #[error("Failed to serialize output: {0}")]
    Serialization(String),
}

impl From<ConfigurationError> for Error {
    fn from(error: ConfigurationError) -> Self {
        Error::Config(error.to_string())
    }
}
