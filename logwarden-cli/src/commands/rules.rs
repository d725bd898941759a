//! `logwarden rules` command handler

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tracing::info;

use logwarden_core::config::LogwardenConfig;
use logwarden_filter::{FilterConfig, RuleEngine, RuleKind, RuleLoader};

use crate::cli::{RulesAction, RulesArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `rules` command.
pub async fn execute(
    args: RulesArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        RulesAction::List => execute_list(config_path, writer).await,
        RulesAction::Validate {
            path,
            kind,
            recursive,
        } => execute_validate(&path, kind, recursive, writer).await,
    }
}

/// Load every configured rule source and report the resulting rule sets.
async fn execute_list(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    let config = LogwardenConfig::load(config_path).await?;
    let filter_config = FilterConfig::from_core(&config.filter)?;

    info!(
        sources = filter_config.sources.len(),
        "loading filter rules"
    );

    let mut engine = RuleEngine::with_precedence(filter_config.precedence.clone());
    engine.load_sources(&filter_config).await?;

    let report = RuleListReport {
        total_sets: engine.rule_set_count(),
        total_rules: engine.total_rule_count(),
        sets: engine
            .rule_sets()
            .iter()
            .map(|set| RuleSetEntry {
                source: set.source_path().display().to_string(),
                kind: set.kind().to_string(),
                rules: set.len(),
            })
            .collect(),
    };

    writer.render(&report)?;
    Ok(())
}

/// Load one rule file or directory and report what it yields.
///
/// Invalid patterns inside files are skipped by the loader (with warnings);
/// only a missing path or an undecidable rule kind fails the command.
async fn execute_validate(
    path: &Path,
    kind: Option<String>,
    recursive: bool,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let kind = kind
        .as_deref()
        .map(str::parse::<RuleKind>)
        .transpose()?;

    info!(path = %path.display(), recursive, "validating rule source");

    let loader = RuleLoader::new().with_recursive(recursive);
    let is_dir = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let result = if is_dir {
        loader.load_directory(path, kind).await
    } else {
        loader.load_file(path, kind).await.map(|set| vec![set])
    };

    let report = match result {
        Ok(sets) => RuleValidationReport {
            path: path.display().to_string(),
            valid: true,
            rule_sets: sets.len(),
            rules: sets.iter().map(|s| s.len()).sum(),
            error: None,
        },
        Err(e) => RuleValidationReport {
            path: path.display().to_string(),
            valid: false,
            rule_sets: 0,
            rules: 0,
            error: Some(e.to_string()),
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Rule(format!(
            "rule source '{}' failed to load",
            path.display()
        )));
    }

    Ok(())
}

#[derive(Serialize)]
pub struct RuleListReport {
    pub total_sets: usize,
    pub total_rules: usize,
    pub sets: Vec<RuleSetEntry>,
}

#[derive(Serialize)]
pub struct RuleSetEntry {
    pub source: String,
    pub kind: String,
    pub rules: usize,
}

impl Render for RuleListReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "{:<12} {:>6}  {}", "Kind", "Rules", "Source")?;
        writeln!(w, "{}", "-".repeat(60))?;
        for entry in &self.sets {
            let kind = match entry.kind.as_str() {
                "ignore" => entry.kind.dimmed(),
                _ => entry.kind.red(),
            };
            writeln!(w, "{:<12} {:>6}  {}", kind, entry.rules, entry.source)?;
        }
        writeln!(w)?;
        writeln!(
            w,
            "{} rule(s) in {} set(s)",
            self.total_rules, self.total_sets
        )?;
        Ok(())
    }
}

#[derive(Serialize)]
pub struct RuleValidationReport {
    pub path: String,
    pub valid: bool,
    pub rule_sets: usize,
    pub rules: usize,
    pub error: Option<String>,
}

impl Render for RuleValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        if self.valid {
            writeln!(
                w,
                "{}: {} rule(s) in {} set(s) from {}",
                "ok".green(),
                self.rules,
                self.rule_sets,
                self.path
            )?;
        } else {
            writeln!(w, "{}: {}", "error".red(), self.path)?;
            if let Some(ref error) = self.error {
                writeln!(w, "  {}", error)?;
            }
        }
        Ok(())
    }
}
