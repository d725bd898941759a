//! `logwarden filter` command handler
//!
//! Reads log lines from stdin, classifies each against the configured
//! rule sources, and forwards non-ignored lines to stdout. This is the
//! one-shot shell equivalent of running the filter stage inside a
//! log-shipping pipeline.

use std::io::{BufRead, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

use logwarden_core::config::LogwardenConfig;
use logwarden_filter::{FilterConfig, FilterStats, RuleEngine, RuleKind, RuleMetadata};

use crate::cli::{FilterArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `filter` command.
pub async fn execute(
    args: FilterArgs,
    config_path: &Path,
    format: OutputFormat,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = LogwardenConfig::load(config_path).await?;
    let filter_config = FilterConfig::from_core(&config.filter)?;

    let mut engine = RuleEngine::with_precedence(filter_config.precedence.clone());
    engine.load_sources(&filter_config).await?;

    info!(
        rules = engine.total_rule_count(),
        sets = engine.rule_set_count(),
        "filtering stdin"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let decision = engine.filter(&line);

        if decision.is_ignore() {
            continue;
        }

        match format {
            OutputFormat::Text => writeln!(out, "{line}")?,
            OutputFormat::Json => {
                let entry = LineEntry {
                    message: &line,
                    disposition: decision.disposition().to_string(),
                    rule: decision.rule().map(|r| r.metadata()),
                };
                serde_json::to_writer(&mut out, &entry)?;
                writeln!(out)?;
            }
        }
    }
    drop(out);

    if args.stats {
        writer.render(&StatsReport::from(engine.statistics()))?;
    }

    Ok(())
}

/// One forwarded line in JSON output mode.
#[derive(Serialize)]
struct LineEntry<'a> {
    message: &'a str,
    disposition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<RuleMetadata>,
}

/// Engine statistics summary rendered with `--stats`.
#[derive(Serialize)]
pub struct StatsReport {
    pub total_messages: u64,
    pub ignored_messages: u64,
    pub alert_messages: u64,
    pub passed_messages: u64,
    pub rule_matches: Vec<(String, u64)>,
}

impl From<FilterStats> for StatsReport {
    fn from(stats: FilterStats) -> Self {
        let mut rule_matches: Vec<(String, u64)> = RuleKind::ALL
            .iter()
            .filter_map(|kind| {
                stats
                    .rule_matches
                    .get(kind)
                    .map(|count| (kind.to_string(), *count))
            })
            .collect();
        rule_matches.sort();

        Self {
            total_messages: stats.total_messages,
            ignored_messages: stats.ignored_messages,
            alert_messages: stats.alert_messages,
            passed_messages: stats.passed_messages,
            rule_matches,
        }
    }
}

impl Render for StatsReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Messages: {}", self.total_messages)?;
        writeln!(w, "  ignored: {}", self.ignored_messages)?;
        writeln!(w, "  alerts:  {}", self.alert_messages)?;
        writeln!(w, "  passed:  {}", self.passed_messages)?;
        if !self.rule_matches.is_empty() {
            writeln!(w, "Rule matches by kind:")?;
            for (kind, count) in &self.rule_matches {
                writeln!(w, "  {kind}: {count}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn stats_report_orders_kinds_by_name() {
        let mut rule_matches = HashMap::new();
        rule_matches.insert(RuleKind::Violations, 3);
        rule_matches.insert(RuleKind::Cracking, 5);

        let stats = FilterStats {
            total_messages: 10,
            ignored_messages: 2,
            alert_messages: 8,
            passed_messages: 0,
            rule_matches,
        };

        let report = StatsReport::from(stats);
        assert_eq!(
            report.rule_matches,
            vec![("cracking".to_owned(), 5), ("violations".to_owned(), 3)]
        );
    }

    #[test]
    fn stats_report_renders_counts() {
        let report = StatsReport {
            total_messages: 4,
            ignored_messages: 1,
            alert_messages: 2,
            passed_messages: 1,
            rule_matches: vec![("cracking".to_owned(), 2)],
        };

        let mut buffer = Vec::new();
        report.render_text(&mut buffer).expect("render");
        let text = String::from_utf8(buffer).expect("utf-8");
        assert!(text.contains("Messages: 4"));
        assert!(text.contains("cracking: 2"));
    }
}
