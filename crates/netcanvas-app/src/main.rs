//! `netcanvas`: replays an event script against a diagram and prints the result.

mod script;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use netcanvas_core::{ConfigError, Diagram, Editor, EngineConfig, HistoryError, PathResult, SequentialIdGenerator};
use serde::Serialize;
use thiserror::Error;

use crate::script::{Script, replay};

/// Headless driver for the NetCanvas interaction engine.
#[derive(Parser, Debug)]
#[command(name = "netcanvas", version, about)]
struct Cli {
    /// Diagram JSON (`{devices, connections, buildings}`)
    diagram: PathBuf,

    /// Event script JSON to replay
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Engine configuration JSON
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resolve the uplink path of this device after the replay
    #[arg(short, long)]
    path: Option<String>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    History(#[from] HistoryError),
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    diagram: &'a Diagram,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathResult>,
}

fn read(path: &Path) -> Result<String, AppError> {
    std::fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(cli: &Cli) -> Result<String, AppError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_json(&read(path)?)?,
        None => EngineConfig::default(),
    };
    let diagram: Diagram = serde_json::from_str(&read(&cli.diagram)?)?;
    log::info!(
        "Loaded {} devices, {} connections, {} buildings",
        diagram.devices.len(),
        diagram.connections.len(),
        diagram.buildings.len()
    );

    let mut editor = Editor::new(diagram, config)?.with_id_generator(SequentialIdGenerator::new());

    if let Some(path) = &cli.script {
        let script = Script::from_json(&read(path)?)?;
        let outcomes = replay(&mut editor, &script)?;
        log::info!("Replayed {} steps, {} pointer outcomes", script.steps.len(), outcomes.len());
    }

    let path = cli.path.as_deref().map(|device| {
        let result = editor.find_path_to_uplink(device);
        if result.is_found() {
            log::info!("Uplink path found for {device}");
        } else {
            log::info!("No uplink path for {device}: {:?}", result.failure());
        }
        result
    });
    let report = Report {
        diagram: editor.diagram(),
        path,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("netcanvas: {e}");
            ExitCode::FAILURE
        }
    }
}
