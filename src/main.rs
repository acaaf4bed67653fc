//! NIDS Sentinel entrypoint: score a capture or flow table offline, or run a
//! preset scenario. Results go to stdout as JSON; diagnostics go to stderr.

use clap::{Parser, Subcommand};
use nids_sentinel::{
    config::SentinelConfig,
    logging::StructuredLogger,
    model::ModelHandle,
    scenario::{simulate, Scenario},
    Analyzer, SentinelError,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "nids-sentinel")]
#[command(version)]
#[command(about = "Flow anomaly scoring for packet captures and flow tables", long_about = None)]
struct Cli {
    /// Config file (JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score a .pcap/.pcapng capture or a delimited flow table
    Analyze {
        file: PathBuf,
        /// Indent the JSON report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the feature vectors of an upload, one JSON object per line
    Extract { file: PathBuf },
    /// Score a preset traffic profile: normal or attack
    Simulate { scenario: String },
}

fn read_upload(path: &Path) -> Result<(String, Vec<u8>), SentinelError> {
    let bytes = std::fs::read(path)
        .map_err(|e| SentinelError::input(format!("{}: {}", path.display(), e)))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok((name, bytes))
}

fn run(cli: Cli) -> Result<(), SentinelError> {
    let config_path = SentinelConfig::locate(cli.config.as_deref());
    let config = SentinelConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);
    info!(config = %config_path.display(), "nids-sentinel starting");

    let model = ModelHandle::load(&config.model)?;
    let analyzer = Analyzer::new(model);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Analyze { file, pretty } => {
            let (name, bytes) = read_upload(&file)?;
            let report = analyzer.analyze(&name, &bytes)?;
            let text = if pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .map_err(|e| SentinelError::Io(e.into()))?;
            writeln!(out, "{}", text)?;
        }
        Commands::Extract { file } => {
            let (name, bytes) = read_upload(&file)?;
            for vector in analyzer.extract(&name, &bytes)? {
                StructuredLogger::emit_json(&vector, &mut out)?;
            }
        }
        Commands::Simulate { scenario } => {
            let scenario: Scenario = scenario.parse()?;
            let result = simulate(analyzer.scorer(), scenario, &config.bands)?;
            info!(status = result.band.message(), "simulation complete");
            StructuredLogger::emit_json(&result, &mut out)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            match e {
                SentinelError::Input(_) => ExitCode::from(2),
                SentinelError::Configuration(_) => ExitCode::from(3),
                _ => ExitCode::from(1),
            }
        }
    }
}
