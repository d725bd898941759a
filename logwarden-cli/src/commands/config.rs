//! `logwarden config` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use logwarden_core::config::LogwardenConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Attempt to load and validate the configuration file, reporting any errors.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let result = LogwardenConfig::load(config_path).await;

    let report = match result {
        Ok(_) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load and display the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = LogwardenConfig::load(config_path).await?;

    let report = match section.as_deref() {
        None => ConfigReport {
            source: config_path.display().to_string(),
            section: None,
            config_toml: toml::to_string_pretty(&config)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
        Some("general") => ConfigReport {
            source: config_path.display().to_string(),
            section: Some("general".to_owned()),
            config_toml: toml::to_string_pretty(&config.general)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
        Some("filter") => ConfigReport {
            source: config_path.display().to_string(),
            section: Some("filter".to_owned()),
            config_toml: toml::to_string_pretty(&config.filter)
                .unwrap_or_else(|e| format!("(serialization error: {})", e)),
        },
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown config section '{}', expected 'general' or 'filter'",
                other
            )));
        }
    };

    writer.render(&report)?;
    Ok(())
}

#[derive(Serialize)]
pub struct ConfigValidationReport {
    pub source: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(w, "{}: {}", "ok".green(), self.source)?;
        } else {
            writeln!(w, "{}: {}", "invalid".red(), self.source)?;
            for error in &self.errors {
                writeln!(w, "  {}", error)?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
pub struct ConfigReport {
    pub source: String,
    pub section: Option<String>,
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        match &self.section {
            Some(section) => writeln!(w, "# {} [{}]", self.source, section)?,
            None => writeln!(w, "# {}", self.source)?,
        }
        writeln!(w, "{}", self.config_toml)?;
        Ok(())
    }
}
