use std::path::{Path, PathBuf};

use clap::Subcommand;
use relkit_model::export::secret_marker;
use relkit_model::{
    AsMap, ConfigLoader, EnvironmentSecretResolver, ReleaseContext, SecretAware, SecretResolver,
};
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::errors::Error;

#[cfg(test)]
#[path = "config_cmd_tests.rs"]
mod tests;

/// Subcommands for the config command
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the merged and resolved configuration as JSON
    Show {
        /// Configuration files, lowest precedence first
        #[arg(short = 'c', long = "config", required = true)]
        config: Vec<PathBuf>,

        /// Include disabled entities
        #[arg(long)]
        full: bool,

        /// Directory template files are resolved against
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// List the environment variables consulted for secrets
    Secrets {
        /// Configuration files, lowest precedence first
        #[arg(short = 'c', long = "config", required = true)]
        config: Vec<PathBuf>,
    },
}

/// Execute the config command
#[instrument]
pub fn execute(cmd: &ConfigCommands) -> Result<(), Error> {
    match cmd {
        ConfigCommands::Show {
            config,
            full,
            base_dir,
        } => {
            let base_dir = base_dir.clone().unwrap_or_else(|| default_base_dir(config));
            let output = show_config(
                config,
                *full,
                &base_dir,
                Box::new(EnvironmentSecretResolver::new()),
            )?;
            println!("{output}");
            Ok(())
        }
        ConfigCommands::Secrets { config } => {
            for (variable, marker) in list_secrets(config, &EnvironmentSecretResolver::new())? {
                println!("{variable:<48} {marker}");
            }
            Ok(())
        }
    }
}

/// Directory of the first configuration file, or the working directory.
pub fn default_base_dir(config: &[PathBuf]) -> PathBuf {
    config
        .first()
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Loads, merges, resolves and freezes the configuration and renders the
/// diagnostic map as pretty JSON.
pub fn show_config(
    config: &[PathBuf],
    full: bool,
    base_dir: &Path,
    resolver: Box<dyn SecretResolver>,
) -> Result<String, Error> {
    if config.is_empty() {
        return Err(Error::InvalidArguments(
            "at least one --config file is required".to_string(),
        ));
    }

    let model = ConfigLoader::new().load_layers(config)?;
    let context = ReleaseContext::with_resolver(base_dir, model, resolver)?;
    info!(message = "Configuration resolved", layers = config.len(), full);

    let map = context.model().as_map(full);
    serde_json::to_string_pretty(&Value::Object(map)).map_err(|e| Error::Serialization(e.to_string()))
}

/// Secret variable names with a marker telling whether each is set.
pub fn list_secrets(
    config: &[PathBuf],
    resolver: &dyn SecretResolver,
) -> Result<Vec<(String, &'static str)>, Error> {
    let model = ConfigLoader::new().load_layers(config)?;
    let variables = model.secret_variables();
    debug!(message = "Collected secret variables", count = variables.len());

    Ok(variables
        .into_iter()
        .map(|variable| {
            let marker = secret_marker(resolver.resolve_secret(&variable).as_deref());
            (variable, marker)
        })
        .collect())
}
