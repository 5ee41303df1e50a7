use std::io::{self, BufRead, Write};
use std::sync::OnceLock;

use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tokio::sync::mpsc;

use crate::bench::sequential::{CancelFlag, Phase, ProgressUpdate, SequentialBenchmark};
use crate::config::BenchmarkConfig;
use crate::models::BenchmarkReport;
use crate::util::units::format_bytes;
use crate::{DiskSpeedError, Result};

/// Most digits accepted for the chunk size in KB
pub const CHUNK_KB_MAX_DIGITS: usize = 3;

/// Most digits accepted for the file size in MB
pub const FILE_MB_MAX_DIGITS: usize = 5;

/// Compiled once and shared by every prompt and flag
fn digits_pattern() -> std::result::Result<&'static Regex, &'static regex::Error> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[0-9]+$")).as_ref()
}

/// Validate a size entered by the user.
///
/// An empty answer keeps the default and yields `None`. Anything else
/// must be 1 to `max_digits` decimal digits and greater than zero.
pub fn parse_size(input: &str, max_digits: usize) -> Result<Option<u64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let pattern = digits_pattern()
        .map_err(|e| DiskSpeedError::ConfigError(format!("invalid size pattern: {}", e)))?;
    if input.len() > max_digits || !pattern.is_match(input) {
        return Err(DiskSpeedError::InvalidInput(format!(
            "expected 1 to {} digits, got {:?}",
            max_digits, input
        )));
    }

    match input.parse::<u64>() {
        Ok(0) => Err(DiskSpeedError::InvalidInput("size must be greater than 0".to_string())),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(DiskSpeedError::InvalidInput(format!("{:?}: {}", input, e))),
    }
}

/// Print `prompt` and read one line. End of input counts as an abort.
fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<String> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(DiskSpeedError::Aborted);
    }
    Ok(line)
}

/// Which sizes still have to be asked for
#[derive(Debug, Clone, Copy)]
pub struct PromptFields {
    pub chunk: bool,
    pub file: bool,
}

/// Prompt the user for chunk size and file size.
///
/// Invalid answers silently restart the questions. A chunk size that was
/// accepted before a later answer failed stays applied.
pub fn ask_config<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    mut config: BenchmarkConfig,
    fields: PromptFields,
) -> Result<BenchmarkConfig> {
    loop {
        if fields.chunk {
            let prompt = format!(
                "Please give cluster size: (in KB, default {} KB) ",
                config.chunk_kb()
            );
            let answer = prompt_line(input, output, &prompt)?;
            match parse_size(&answer, CHUNK_KB_MAX_DIGITS) {
                Ok(kb) => config.configure(kb, None),
                Err(DiskSpeedError::InvalidInput(msg)) => {
                    log::debug!("rejected cluster size: {}", msg);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        if fields.file {
            let prompt = format!(
                "Please give temporary filesize: (in MB, default {} MB) ",
                config.file_mb()
            );
            let answer = prompt_line(input, output, &prompt)?;
            match parse_size(&answer, FILE_MB_MAX_DIGITS) {
                Ok(mb) => config.configure(None, mb),
                Err(DiskSpeedError::InvalidInput(msg)) => {
                    log::debug!("rejected file size: {}", msg);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        return Ok(config);
    }
}

/// Print the parameters of the upcoming run
pub fn print_header<W: Write>(output: &mut W, config: &BenchmarkConfig) -> Result<()> {
    writeln!(output, "Testing speed...")?;
    writeln!(
        output,
        "==> cluster size: {} ({})",
        config.chunk_size,
        format_bytes(config.chunk_size)
    )?;
    writeln!(
        output,
        "==> file size: {} ({})",
        config.file_size,
        format_bytes(config.file_size)
    )?;
    writeln!(output, "==> target: {}", config.target_path.display())?;
    writeln!(output, "==> start time: {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    Ok(())
}

/// Draw one progress bar per phase, overwriting the line in place
async fn render_progress(mut rx: mpsc::Receiver<ProgressUpdate>) {
    let style = ProgressStyle::with_template(
        "{msg}: {bytes} of {total_bytes} [{bar:30}] {binary_bytes_per_sec}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");

    let mut current: Option<(Phase, ProgressBar)> = None;
    while let Some(update) = rx.recv().await {
        let same_phase = matches!(&current, Some((phase, _)) if *phase == update.phase);
        if !same_phase {
            if let Some((_, pb)) = current.take() {
                pb.finish();
            }
            let pb = ProgressBar::new(update.total_bytes);
            pb.set_style(style.clone());
            pb.set_message(update.phase.label());
            current = Some((update.phase, pb));
        }
        if let Some((_, pb)) = &current {
            pb.set_position(update.bytes_processed);
        }
    }

    if let Some((_, pb)) = current {
        pb.finish();
    }
}

/// Run the benchmark on a blocking thread and stream its progress.
pub async fn run_speedtest(
    config: BenchmarkConfig,
    cancel: CancelFlag,
    show_progress: bool,
) -> Result<BenchmarkReport> {
    let mut benchmark = SequentialBenchmark::new(config)?.with_cancel_flag(cancel);

    let renderer = if show_progress {
        let (tx, rx) = mpsc::channel(100);
        benchmark = benchmark.with_progress(tx);
        Some(tokio::spawn(render_progress(rx)))
    } else {
        None
    };

    // The sender lives inside the benchmark, so the renderer ends with it
    let result = tokio::task::spawn_blocking(move || benchmark.run()).await?;
    if let Some(handle) = renderer {
        handle.await.ok();
    }
    result
}

/// How the session interacts with the user
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Sizes still to be asked for
    pub prompt: PromptFields,
    /// Print the report as JSON instead of the text block
    pub json: bool,
}

/// Prompt for missing values, run the benchmark and print the report
pub async fn session(
    config: BenchmarkConfig,
    options: SessionOptions,
    cancel: CancelFlag,
) -> Result<()> {
    let config = if options.prompt.chunk || options.prompt.file {
        tokio::task::spawn_blocking(move || {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut output = io::stdout();
            ask_config(&mut input, &mut output, config, options.prompt)
        })
        .await??
    } else {
        config
    };

    if !options.json {
        print_header(&mut io::stdout(), &config)?;
    }

    let report = run_speedtest(config, cancel, !options.json).await?;

    if options.json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
