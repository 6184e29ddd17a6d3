//! Command modules for the relkit CLI.
//!
//! - `config_cmd`: inspect merged and resolved release configuration

pub mod config_cmd;
