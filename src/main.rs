use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use diskspeed::bench::CancelFlag;
use diskspeed::config::{BenchmarkConfig, Settings};
use diskspeed::simple::{
    parse_size, session, PromptFields, SessionOptions, CHUNK_KB_MAX_DIGITS, FILE_MB_MAX_DIGITS,
};
use diskspeed::{error, io, pause, DiskSpeedError, Result};

/// How long an interrupted run may take to stop and remove its file
const ABORT_GRACE: Duration = Duration::from_secs(2);

/// Measure sequential write and read throughput of a disk
#[derive(Parser, Debug)]
#[clap(name = "diskspeed", version, about)]
struct Cli {
    /// Chunk ("cluster") size in KB, 1-3 digits; skips the prompt
    #[clap(long, value_name = "KB")]
    chunk_kb: Option<String>,

    /// Temporary file size in MB, 1-5 digits; skips the prompt
    #[clap(long, value_name = "MB")]
    file_mb: Option<String>,

    /// Directory to place diskspeed.tmp in (default: system temp dir)
    #[clap(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Accept defaults for every size that was not given
    #[clap(short = 'y', long)]
    yes: bool,

    /// Print the report as JSON
    #[clap(long)]
    json: bool,

    /// Exit without waiting for a key press
    #[clap(long)]
    no_pause: bool,

    /// Do not flush the file to the device at the end of the write phase
    #[clap(long)]
    no_sync: bool,
}

/// Resolve the configuration from settings file and flags
fn build_config(cli: &Cli, settings: &Settings) -> Result<(BenchmarkConfig, PromptFields)> {
    let chunk_kb = match &cli.chunk_kb {
        Some(value) => Some(flag_size("--chunk-kb", value, CHUNK_KB_MAX_DIGITS)?),
        None => None,
    };
    let file_mb = match &cli.file_mb {
        Some(value) => Some(flag_size("--file-mb", value, FILE_MB_MAX_DIGITS)?),
        None => None,
    };

    let mut config = BenchmarkConfig::from_settings(settings);
    config.configure(chunk_kb, file_mb);
    if let Some(dir) = &cli.dir {
        config = config.with_target_dir(dir);
    }
    if cli.no_sync {
        config = config.with_sync(false);
    }
    config.validate()?;

    let fields = PromptFields {
        chunk: chunk_kb.is_none() && !cli.yes,
        file: file_mb.is_none() && !cli.yes,
    };
    Ok((config, fields))
}

fn flag_size(flag: &str, value: &str, max_digits: usize) -> Result<u64> {
    match parse_size(value, max_digits) {
        Ok(Some(size)) => Ok(size),
        Ok(None) => Err(DiskSpeedError::ConfigError(format!("{} needs a value", flag))),
        Err(e) => Err(DiskSpeedError::ConfigError(format!("{}: {}", flag, e))),
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for interrupts: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let setup = Settings::load().and_then(|settings| {
        let (config, fields) = build_config(&cli, &settings)?;
        Ok((config, fields, settings.pause_enabled()))
    });
    let (config, fields, pause_enabled) = match setup {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{}", error::user_friendly_message(&e));
            std::process::exit(1);
        }
    };

    let acknowledge = pause::platform_default(pause_enabled && !cli.no_pause && !cli.json);
    let target_path = config.target_path.clone();
    let cancel = CancelFlag::new();
    let options = SessionOptions {
        prompt: fields,
        json: cli.json,
    };

    let mut task = tokio::spawn(session(config, options, cancel.clone()));
    let outcome = tokio::select! {
        joined = &mut task => joined.map_err(DiskSpeedError::from).and_then(|r| r),
        _ = interrupted() => {
            cancel.cancel();
            // Before the run starts no file exists; a pending prompt never returns
            if cancel.is_started()
                && tokio::time::timeout(ABORT_GRACE, &mut task).await.is_err()
            {
                log::debug!("session still busy after interrupt");
            }
            Err(DiskSpeedError::Aborted)
        }
    };

    // The run removes its own file; this covers interrupts and unwinds
    if let Err(e) = io::clear(&target_path) {
        log::warn!("cleanup failed: {}", e);
    }

    match &outcome {
        Ok(()) => {
            if let Err(e) = acknowledge.wait() {
                log::warn!("{}", e);
            }
        }
        Err(e) if error::is_user_abort(e) => println!("\nProgram aborted."),
        Err(e) => {
            log::debug!("run failed: {:?}", e);
            eprintln!("Error: {}", error::user_friendly_message(e));
        }
    }

    std::process::exit(error::exit_code(&outcome));
}
