//! # CLI Module
//!
//! Command line interface for Foldview.
//!
//! Every command loads a record snapshot file, folds it through one derived
//! view and prints the result. Commands return the serialized result so the
//! integration tests can inspect it.

use clap::{Parser, Subcommand};
use foldview_core::registry::{ConfigList, GeneratedCss, PresetList};
use foldview_core::{Record, RecordLog, ScanResult, ViewKind, evaluate_view};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown record format: {0}. Use 'auto', 'json' or 'jsonl'")]
    InvalidFormat(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Core(#[from] foldview_core::Error),
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Parser, Debug)]
#[command(name = "foldview")]
#[command(about = "Derived views over an append-only record log", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Record snapshot file (JSON array or JSON lines)
    #[arg(short, long, global = true)]
    pub records: Option<PathBuf>,

    /// Record file format: auto, json, jsonl
    #[arg(short, long, global = true, default_value = "auto")]
    pub format: String,

    /// Print compact JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List utility classes referenced by modules, assets and routers
    Scan {
        /// Skip module records
        #[arg(long)]
        no_modules: bool,
        /// Skip HTML asset records
        #[arg(long)]
        no_assets: bool,
        /// Skip router records
        #[arg(long)]
        no_routers: bool,
    },
    /// List named configurations
    Configs,
    /// List registered presets by priority
    Presets {
        /// Omit each preset's config object
        #[arg(long)]
        no_config: bool,
    },
    /// Show the latest generated stylesheet for a configuration
    Css {
        /// Configuration name
        #[arg(short, long)]
        config: String,
    },
    /// Evaluate any view by name
    View {
        /// View name (see `foldview views`)
        name: String,
        /// Raw parameters as a JSON object
        #[arg(short, long)]
        params: Option<String>,
    },
    /// List the available views
    Views,
}

// =============================================================================
// RECORD LOADING
// =============================================================================

/// Layout of a record snapshot file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Pick by file extension.
    Auto,
    /// One JSON array of records.
    Json,
    /// One record per line.
    Jsonl,
}

impl RecordFormat {
    /// Resolve `Auto` against a path: `.jsonl` and `.ndjson` are line files.
    #[must_use]
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            Self::Auto => match path.extension().and_then(|ext| ext.to_str()) {
                Some("jsonl" | "ndjson") => Self::Jsonl,
                _ => Self::Json,
            },
            other => other,
        }
    }
}

impl FromStr for RecordFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            other => Err(CliError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        })
    }
}

/// Load a record snapshot into an ordered log.
///
/// Records may appear in any order in the file; ids must be unique.
pub fn load_records(path: &Path, format: &str) -> Result<RecordLog, CliError> {
    let format = format.parse::<RecordFormat>()?.resolve(path);
    let content = std::fs::read_to_string(path)?;

    let records: Vec<Record> = match format {
        RecordFormat::Jsonl => parse_lines(&content)?,
        _ => serde_json::from_str(&content)?,
    };

    let log = RecordLog::from_records(records)?;
    info!(
        path = %path.display(),
        format = %format,
        records = log.len(),
        "loaded record snapshot"
    );
    Ok(log)
}

fn parse_lines<T: DeserializeOwned>(content: &str) -> Result<Vec<T>, CliError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| CliError::Line {
                line: index.saturating_add(1),
                source,
            })
        })
        .collect()
}

/// Parse `--params`: absent means no overrides, otherwise a JSON object.
pub fn parse_params(params: Option<&str>) -> Result<Value, CliError> {
    let Some(text) = params else {
        return Ok(Value::Null);
    };
    match serde_json::from_str::<Value>(text) {
        Ok(value @ (Value::Object(_) | Value::Null)) => Ok(value),
        Ok(other) => Err(CliError::InvalidParams(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(err) => Err(CliError::InvalidParams(err.to_string())),
    }
}

fn require_records(records: Option<&Path>) -> Result<&Path, CliError> {
    records.ok_or_else(|| CliError::InvalidParams("--records <PATH> is required".to_string()))
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Run a parsed command line.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let records = cli.records.as_deref();
    match &cli.command {
        Commands::Scan {
            no_modules,
            no_assets,
            no_routers,
        } => cmd_scan(
            require_records(records)?,
            &cli.format,
            cli.json,
            !no_modules,
            !no_assets,
            !no_routers,
        )
        .map(drop),
        Commands::Configs => {
            cmd_configs(require_records(records)?, &cli.format, cli.json).map(drop)
        }
        Commands::Presets { no_config } => {
            cmd_presets(require_records(records)?, &cli.format, cli.json, !no_config).map(drop)
        }
        Commands::Css { config } => {
            cmd_css(require_records(records)?, &cli.format, cli.json, config).map(drop)
        }
        Commands::View { name, params } => cmd_view(
            require_records(records)?,
            &cli.format,
            cli.json,
            name,
            params.as_deref(),
        )
        .map(drop),
        Commands::Views => cmd_views(cli.json).map(drop),
    }
}

fn evaluate_file(
    records: &Path,
    format: &str,
    view: ViewKind,
    raw: &Value,
) -> Result<Value, CliError> {
    let log = load_records(records, format)?;
    debug!(view = %view, params = %raw, "evaluating view");
    Ok(evaluate_view(view, &log, raw)?)
}

fn print_json(value: &Value, compact: bool) -> Result<(), CliError> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Scan command - list referenced utility classes.
pub fn cmd_scan(
    records: &Path,
    format: &str,
    json: bool,
    include_modules: bool,
    include_assets: bool,
    include_routers: bool,
) -> Result<Value, CliError> {
    let raw = json!({
        "includeModules": include_modules,
        "includeAssets": include_assets,
        "includeRouters": include_routers,
    });
    let value = evaluate_file(records, format, ViewKind::ScanClasses, &raw)?;

    if json {
        print_json(&value, true)?;
    } else {
        let result: ScanResult = serde_json::from_value(value.clone())?;
        for class in &result.classes {
            println!("{class}");
        }
        println!(
            "-- {} classes from {} records",
            result.count, result.scanned_records
        );
    }
    Ok(value)
}

/// Configs command - list named configurations.
pub fn cmd_configs(records: &Path, format: &str, json: bool) -> Result<Value, CliError> {
    let value = evaluate_file(records, format, ViewKind::GetConfigs, &Value::Null)?;

    if json {
        print_json(&value, true)?;
    } else {
        let list: ConfigList = serde_json::from_value(value.clone())?;
        println!("Configurations: {}", list.count);
        for config in &list.configs {
            let presets = if config.presets.is_empty() {
                "-".to_string()
            } else {
                config.presets.join(", ")
            };
            println!("  {}  presets: {presets}", config.name);
        }
    }
    Ok(value)
}

/// Presets command - list registered presets, highest priority first.
pub fn cmd_presets(
    records: &Path,
    format: &str,
    json: bool,
    include_config: bool,
) -> Result<Value, CliError> {
    let raw = json!({ "includeConfig": include_config });
    let value = evaluate_file(records, format, ViewKind::GetPresets, &raw)?;

    if json {
        print_json(&value, true)?;
    } else {
        let list: PresetList = serde_json::from_value(value.clone())?;
        println!("Presets: {}", list.count);
        for preset in &list.presets {
            println!(
                "  [{:>4}] {}  {}",
                preset.priority,
                preset.name,
                preset.module.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(value)
}

/// Css command - show the latest generated stylesheet for one configuration.
pub fn cmd_css(records: &Path, format: &str, json: bool, config: &str) -> Result<Value, CliError> {
    let raw = json!({ "configName": config });
    let value = evaluate_file(records, format, ViewKind::GetGeneratedCss, &raw)?;

    if json {
        print_json(&value, true)?;
    } else {
        let css: GeneratedCss = serde_json::from_value(value.clone())?;
        match css.content {
            Some(content) if css.found => {
                println!(
                    "/* {config}: {} classes, generated {} */",
                    css.class_count,
                    css.generated_at.as_deref().unwrap_or("unknown")
                );
                println!("{content}");
            }
            _ => println!("No generated CSS for '{config}'"),
        }
    }
    Ok(value)
}

/// View command - evaluate any view by name with raw JSON parameters.
pub fn cmd_view(
    records: &Path,
    format: &str,
    json: bool,
    name: &str,
    params: Option<&str>,
) -> Result<Value, CliError> {
    let view = name.parse::<ViewKind>()?;
    let raw = parse_params(params)?;
    let value = evaluate_file(records, format, view, &raw)?;
    print_json(&value, json)?;
    Ok(value)
}

/// Views command - list the available views.
pub fn cmd_views(json: bool) -> Result<Value, CliError> {
    let mut listing = Map::new();
    for view in ViewKind::ALL {
        listing.insert(view.name().to_string(), json!(view.description()));
    }
    let value = Value::Object(listing);

    if json {
        print_json(&value, true)?;
    } else {
        for view in ViewKind::ALL {
            println!("{:<20} {}", view.name(), view.description());
        }
    }
    Ok(value)
}
