//! stencil-cli: send one image to a stencil server from the command line.
//!
//! Runs the same submission controller as the web client: the file is
//! validated, posted with the chosen threshold, and the returned stencil
//! is written to the output directory under the configured download
//! name. Handy for checking a server deployment without a browser.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin stencil-cli -- [OPTIONS] <IMAGE_PATH>
//! ```
//!
//! Set `RUST_LOG=debug` to see every state transition.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod http;
mod store;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use stencil_core::{
    ClientConfig, ConfigError, ControllerCell, GenerationOutcome, IntakeFile, IntakeSource,
    SubmissionController, generate, intake,
};

use crate::http::HttpService;
use crate::store::FileStore;

/// Endpoint used when neither `--endpoint` nor `--config-json` names one.
const CLI_DEFAULT_ENDPOINT: &str = "http://localhost:5000/generate-stencil";

/// Turn a photo into a tattoo stencil using a stencil server.
#[derive(Parser)]
#[command(name = "stencil-cli", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP, GIF).
    image_path: PathBuf,

    /// Absolute URL of the stencil endpoint.
    #[arg(long)]
    endpoint: Option<String>,

    /// Threshold from 0 (more detail) to 100 (bolder lines).
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u8>::new().range(0..=100))]
    threshold: Option<u8>,

    /// Directory the stencil is written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Request timeout in milliseconds.
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    timeout_ms: Option<u32>,

    /// Full client config as a JSON string.
    ///
    /// Applied first; `--endpoint`, `--threshold` and `--timeout-ms`
    /// override the matching fields.
    #[arg(long)]
    config_json: Option<String>,
}

fn config_from_cli(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match cli.config_json {
        Some(ref json) => ClientConfig::from_json(json)?,
        None => ClientConfig {
            endpoint: CLI_DEFAULT_ENDPOINT.into(),
            ..ClientConfig::default()
        },
    };
    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(threshold) = cli.threshold {
        config.default_threshold = threshold;
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    Ok(config)
}

fn read_image(path: &Path) -> std::io::Result<IntakeFile> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(IntakeFile {
        name,
        declared_type: None,
        bytes,
        source: IntakeSource::Picker,
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let service = match HttpService::new(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let file = match read_image(&cli.image_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    let store = FileStore::new(cli.output_dir.clone());
    let target = match store.target(&config.download_filename) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let controller = RefCell::new(SubmissionController::new(config, store));

    if let Err(e) = intake(&controller, &service, file) {
        eprintln!("{}", e.user_message());
        return ExitCode::FAILURE;
    }
    if let Some(image) = controller.borrow().selected_image() {
        eprintln!("Image: {} ({})", image.name(), image.dimensions());
    }
    eprintln!("Threshold: {}", controller.borrow().threshold());

    match futures::executor::block_on(generate(&controller, &service)) {
        Ok(GenerationOutcome::Applied(_)) => {}
        Ok(GenerationOutcome::Failed(e)) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
        Ok(GenerationOutcome::Stale(token) | GenerationOutcome::Cancelled(token)) => {
            eprintln!("Generation {token} did not complete");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            return ExitCode::FAILURE;
        }
    }

    match controller.update(SubmissionController::on_download) {
        Ok(()) => {
            println!("{}", target.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
