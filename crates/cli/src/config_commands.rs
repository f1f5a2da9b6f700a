use {anyhow::Result, clap::Subcommand, secrecy::Secret};

use tougao_config::{Severity, TougaoConfig, ValidationResult};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML, with the token redacted.
    Show,
    /// Validate the configuration and report errors/warnings.
    Validate,
}

pub fn handle_config(action: ConfigAction, config: &TougaoConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", render_redacted(config)?);
            Ok(())
        },
        ConfigAction::Validate => {
            match tougao_config::find_config_file() {
                Some(path) => eprintln!("Checking {}\n", path.display()),
                None => eprintln!("No config file found; checking defaults.\n"),
            }
            let result = tougao_config::validate(config);
            report(&result);
            if result.has_errors() {
                std::process::exit(1);
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn render_redacted(config: &TougaoConfig) -> Result<String> {
    let mut shown = config.clone();
    if shown.telegram.has_token() {
        shown.telegram.token = Secret::new("[REDACTED]".into());
    }
    Ok(toml::to_string_pretty(&shown)?)
}

fn report(result: &ValidationResult) {
    for d in &result.diagnostics {
        let (color, label) = match d.severity {
            Severity::Error => (RED, "error"),
            Severity::Warning => (YELLOW, "warning"),
        };
        eprintln!("  {BOLD}{color}{label}{RESET} {}: {}", d.path, d.message);
    }

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if !result.diagnostics.is_empty() {
        eprintln!();
    }
    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }
}
