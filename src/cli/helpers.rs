//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use chrono::NaiveDate;
use console::{style, StyledObject};
use dialoguer::{theme::ColorfulTheme, Confirm};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;
use tabled::{builder::Builder, settings::Style};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::{Record, Tone};
use crate::core::identity::RecordId;
use crate::core::reducer::Action;
use crate::core::seed;
use crate::core::state::AppState;
use crate::core::store::Store;
use crate::core::Config;

/// An open store plus the configuration it was opened with
pub struct Session {
    pub config: Config,
    pub store: Store,
}

impl Session {
    /// Load config, restore the persisted state over the seed data and
    /// save after every dispatch
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = load_config(global);
        let bridge = config.bridge().into_diagnostic()?;
        tracing::debug!(
            data_dir = %config.data_dir().display(),
            backend = %config.backend(),
            key = bridge.key(),
            "opening store"
        );
        let store = Store::with_persistence(seed::initial_data(), bridge);
        Ok(Self { config, store })
    }

    pub fn state(&self) -> Arc<AppState> {
        self.store.state()
    }

    pub fn dispatch(&mut self, action: Action) -> Arc<AppState> {
        self.store.dispatch(action)
    }

    /// Fresh id for a new record
    pub fn new_id(&self) -> RecordId {
        RecordId::generate(self.config.id_strategy())
    }

    pub fn author(&self) -> String {
        self.config.author()
    }
}

/// Layered config with the `--data-dir` flag applied last
pub fn load_config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(ref dir) = global.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config
}

/// Today's calendar date in local time
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse a YYYY-MM-DD date (used as a clap value parser)
pub fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{}': {} (expected YYYY-MM-DD)", s, e))
}

/// Clone the record out of a lookup, or fail with a not-found diagnostic
pub fn require<T: Record>(found: Option<&T>, id: &str) -> Result<T> {
    found
        .cloned()
        .ok_or_else(|| miette::miette!("No {} found with id '{}'", T::KIND, id))
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Counts characters rather than bytes so accented text never splits.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Apply the terminal colour for a semantic tone
pub fn tone_style<D>(value: D, tone: Tone) -> StyledObject<D> {
    let styled = style(value);
    match tone {
        Tone::Success => styled.green(),
        Tone::Info => styled.cyan(),
        Tone::Warning => styled.yellow(),
        Tone::Danger => styled.red(),
        Tone::Critical => styled.red().bold(),
        Tone::Neutral => styled.dim(),
    }
}

/// Ask for confirmation unless `yes` is set
pub fn confirm(prompt: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

/// Print one `label: value` line of a detail view
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{:<18} {}", style(format!("{}:", label)).bold(), value);
}

/// Print a list of records in the requested format
///
/// `row` renders the table cells for one record, matching `headers`.
pub fn output_list<T, F>(
    records: &[&T],
    format: OutputFormat,
    headers: &[&str],
    row: F,
) -> Result<()>
where
    T: Record,
    F: Fn(&T) -> Vec<String>,
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(records).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(records).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => {
            for record in records {
                println!("{}", record.id());
            }
        }
        OutputFormat::Tsv => {
            println!("{}", headers.join("\t"));
            for record in records {
                println!("{}", row(record).join("\t"));
            }
        }
        OutputFormat::Md | OutputFormat::Auto => {
            if records.is_empty() {
                println!("No {} records found.", T::KIND);
                return Ok(());
            }
            let mut builder = Builder::default();
            builder.push_record(headers.iter().copied());
            for record in records {
                builder.push_record(row(record));
            }
            let mut table = builder.build();
            if format == OutputFormat::Md {
                table.with(Style::markdown());
            } else {
                table.with(Style::rounded());
            }
            println!("{}", table);
            if format == OutputFormat::Auto {
                println!(
                    "{}",
                    style(format!("{} {} record(s)", records.len(), T::KIND)).dim()
                );
            }
        }
    }
    Ok(())
}

/// Print a single record: serialized, its id, or a detail view
pub fn output_record<T, F>(record: &T, format: OutputFormat, detail: F) -> Result<()>
where
    T: Record,
    F: FnOnce(&T),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(record).into_diagnostic()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yml::to_string(record).into_diagnostic()?;
            print!("{}", yaml);
        }
        OutputFormat::Id => println!("{}", record.id()),
        OutputFormat::Tsv | OutputFormat::Md | OutputFormat::Auto => detail(record),
    }
    Ok(())
}

/// Report a created or updated record unless `--quiet`
pub fn report(global: &GlobalOpts, verb: &str, kind: &str, id: &RecordId, title: &str) {
    if global.quiet {
        return;
    }
    println!(
        "{} {} {} {}",
        style("✓").green(),
        verb,
        kind,
        style(id).cyan()
    );
    println!("   {}", title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("Política de Calidad", 8), "Polít...");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-15"),
            Ok(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert!(parse_date("15/03/2024").is_err());
    }

    #[test]
    fn test_require_reports_kind() {
        let state = seed::initial_data();
        let err = require(state.risk(&RecordId::new("99")), "99").unwrap_err();
        assert!(err.to_string().contains("No risk found with id '99'"));
        assert!(require(state.risk(&RecordId::new("1")), "1").is_ok());
    }
}
