//! `unirec` — config-driven multi-source customer record reconciliation.
//!
//! Human summaries go to stderr; stdout is reserved for machine-readable
//! output (`--json`, `peek`).

mod exit_codes;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use indexmap::IndexMap;

use unirec_engine::{run, EngineConfig, RawRecord, RunInput};

use exit_codes::{EXIT_INVALID_CONFIG, EXIT_REPORT, EXIT_SOURCE};

// ---------------------------------------------------------------------------
// CLI surface
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "unirec")]
#[command(about = "Multi-source customer record reconciliation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  unirec run recon.toml
  unirec run recon.toml --json
  unirec run recon.toml --output-dir /tmp/recon-out")]
    Run {
        /// Path to the run config file
        config: PathBuf,

        /// Print {summary, output_dir} JSON to stdout
        #[arg(long)]
        json: bool,

        /// Override the configured output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate a run config without reading any sources
    #[command(after_help = "\
Examples:
  unirec validate recon.toml")]
    Validate {
        /// Path to the run config file
        config: PathBuf,
    },

    /// List the columns each source yields, with row counts
    #[command(after_help = "\
Examples:
  unirec peek recon.toml
  unirec peek recon.toml --source billing")]
    Peek {
        /// Path to the run config file
        config: PathBuf,

        /// Only inspect this source
        #[arg(long)]
        source: Option<String>,

        /// Sample size for column discovery
        #[arg(long, default_value_t = 50)]
        max_rows: usize,
    },
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            json,
            output_dir,
        } => cmd_run(&config, json, output_dir),
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Peek {
            config,
            source,
            max_rows,
        } => cmd_peek(&config, source.as_deref(), max_rows),
    };

    match result {
        Ok(()) => ExitCode::from(exit_codes::EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {hint}");
            }
            ExitCode::from(err.code)
        }
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn load_config(config_path: &Path) -> Result<EngineConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        CliError::new(
            EXIT_INVALID_CONFIG,
            format!("cannot read config {}: {e}", config_path.display()),
        )
    })?;
    EngineConfig::from_toml(&config_str)
        .map_err(|e| CliError::new(EXIT_INVALID_CONFIG, e.to_string()))
}

fn cmd_run(config_path: &Path, json: bool, output_dir: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(config_path)?;

    // Source paths resolve relative to the config file's directory.
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut records: IndexMap<String, Vec<RawRecord>> = IndexMap::new();
    for source in &config.sources {
        let rows = unirec_io::read_source(source, base_dir)
            .map_err(|e| CliError::new(EXIT_SOURCE, format!("source '{}': {e}", source.name)))?;
        eprintln!("read {} row(s) from source '{}'", rows.len(), source.name);
        records.insert(source.name.clone(), rows);
    }

    let input = RunInput { records };
    let result = run(&config, &input)
        .map_err(|e| CliError::new(exit_codes::EXIT_ERROR, e.to_string()))?;

    let out_dir = output_dir.unwrap_or_else(|| base_dir.join(&config.output_dir));
    let written = report::write_reports(&out_dir, &result)
        .map_err(|e| CliError::new(EXIT_REPORT, e))?;

    let s = &result.summary;
    eprintln!(
        "reconciled {} record(s) from {} source(s): {} entity group(s), {} duplicate group(s) ({} record(s)), {} mismatch group(s)",
        s.total_records_ingested,
        config.sources.len(),
        s.entity_groups,
        s.duplicate_groups,
        s.duplicate_records,
        s.mismatch_groups,
    );
    eprintln!(
        "wrote {} file(s) to {}: {}",
        written.len(),
        out_dir.display(),
        written.join(", "),
    );

    if json {
        let payload = serde_json::json!({
            "summary": s,
            "output_dir": out_dir.display().to_string(),
        });
        let text = serde_json::to_string_pretty(&payload)
            .map_err(|e| CliError::new(exit_codes::EXIT_ERROR, e.to_string()))?;
        println!("{text}");
    }

    Ok(())
}

fn cmd_validate(config_path: &Path) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    eprintln!(
        "valid: '{}' with {} source(s), threshold {}",
        config.name, config.sources.len(), config.similarity_threshold,
    );
    Ok(())
}

fn cmd_peek(config_path: &Path, only: Option<&str>, max_rows: usize) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let sources: Vec<_> = config
        .sources
        .iter()
        .filter(|s| only.map_or(true, |name| s.name == name))
        .collect();
    if sources.is_empty() {
        return Err(
            CliError::new(EXIT_INVALID_CONFIG, "no matching source in config")
                .with_hint("check --source against the names under [[sources]]"),
        );
    }

    for source in sources {
        let (columns, count) = unirec_io::peek_columns(source, base_dir, max_rows)
            .map_err(|e| CliError::new(EXIT_SOURCE, format!("source '{}': {e}", source.name)))?;
        println!("{} ({}, {} row(s))", source.name, source.kind, count);
        for column in columns {
            println!("  {column}");
        }
    }
    Ok(())
}
