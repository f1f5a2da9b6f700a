//! Configuration loading, env substitution, and validation.
//!
//! Config files: `tougao.toml`, `tougao.yaml`, or `tougao.json`
//! Searched in `./` then `~/.config/tougao/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{PublishConfig, TelegramConfig, TougaoConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
