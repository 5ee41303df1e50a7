//! Sequential benchmark operations
//!
//! Writes the benchmark file chunk by chunk, reads it back the same
//! way and times both phases. Progress is reported through an optional
//! channel and never holds up the I/O loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use chrono::Local;
use tokio::sync::mpsc;
use crate::{DiskSpeedError, Result};
use crate::config::BenchmarkConfig;
use crate::io::disk::{self, TargetFile};
use crate::models::{BenchmarkReport, PhaseResult};

/// Byte value every chunk is filled with
pub const FILL_BYTE: u8 = b'0';

/// Minimum interval between two progress updates of a phase
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(100);

/// The two timed stages of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Write,
    Read,
}

impl Phase {
    /// Label shown in front of the progress line
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Write => "Writing",
            Phase::Read => "Reading",
        }
    }
}

/// Progress update sent during benchmark execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Phase the update belongs to
    pub phase: Phase,
    /// Bytes processed so far in this phase
    pub bytes_processed: u64,
    /// Total bytes to process in this phase
    pub total_bytes: u64,
}

impl ProgressUpdate {
    /// Calculate completion percentage (0.0 to 1.0)
    pub fn completion_percentage(&self) -> f64 {
        if self.total_bytes == 0 {
            0.0
        } else {
            (self.bytes_processed as f64) / (self.total_bytes as f64)
        }
    }
}

/// Source of phase timestamps
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Shared flag asking a running benchmark to stop at the next chunk.
///
/// It also records whether a run has begun, so an interrupt that lands
/// before any file exists does not need to wait for one to be removed.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<CancelState>);

#[derive(Debug, Default)]
struct CancelState {
    cancelled: AtomicBool,
    started: AtomicBool,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }

    /// True once a benchmark using this flag has entered `run`
    pub fn is_started(&self) -> bool {
        self.0.started.load(Ordering::SeqCst)
    }

    fn mark_started(&self) {
        self.0.started.store(true, Ordering::SeqCst);
    }
}

/// Sequential benchmark executor
pub struct SequentialBenchmark<C: Clock = SystemClock> {
    config: BenchmarkConfig,
    clock: C,
    cancel: CancelFlag,
    progress_tx: Option<mpsc::Sender<ProgressUpdate>>,
}

impl SequentialBenchmark {
    /// Create a new sequential benchmark executor
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            clock: SystemClock,
            cancel: CancelFlag::new(),
            progress_tx: None,
        })
    }
}

impl<C: Clock> SequentialBenchmark<C> {
    /// Replace the clock used for phase timestamps
    pub fn with_clock<D: Clock>(self, clock: D) -> SequentialBenchmark<D> {
        SequentialBenchmark {
            config: self.config,
            clock,
            cancel: self.cancel,
            progress_tx: self.progress_tx,
        }
    }

    /// Share a cancellation flag with the caller
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Stream progress updates into `tx`
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressUpdate>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Execute the write phase followed by the read phase
    ///
    /// The benchmark file is removed before this returns, whether the
    /// run succeeded, failed or was cancelled.
    pub fn run(&self) -> Result<BenchmarkReport> {
        // Marked before the first check so an interrupter that saw no
        // run in progress is guaranteed to stop this one before the file exists
        self.cancel.mark_started();
        self.check_cancelled()?;

        let started_at = Local::now();
        let chunk_size = usize::try_from(self.config.chunk_size).map_err(|_| {
            DiskSpeedError::ConfigError(format!(
                "Chunk size too large: {}",
                self.config.chunk_size
            ))
        })?;
        let mut buffer = vec![FILL_BYTE; chunk_size];

        log::debug!(
            "starting run: {} bytes in {} byte chunks at {}",
            self.config.file_size,
            self.config.chunk_size,
            self.config.target_path.display()
        );

        let write_start = self.clock.now();
        let mut target = TargetFile::create(&self.config.target_path)?;
        let written = self.write_phase(&mut target, &buffer)?;
        if self.config.sync_on_write {
            target.sync()?;
        }
        target.close();
        let write_end = self.clock.now();
        log::debug!("write phase done: {} bytes", written);

        let read_start = self.clock.now();
        target.open_for_read()?;
        let read = self.read_phase(&mut target, &mut buffer)?;
        target.close();
        let read_end = self.clock.now();
        log::debug!("read phase done: {} bytes", read);

        Ok(BenchmarkReport {
            started_at,
            chunk_size: self.config.chunk_size,
            file_size: self.config.file_size,
            target_path: self.config.target_path.clone(),
            write: PhaseResult::new(written, write_end.saturating_duration_since(write_start)),
            read: PhaseResult::new(read, read_end.saturating_duration_since(read_start)),
        })
    }

    /// Remove the benchmark file if it is still present
    pub fn clear(&self) -> Result<()> {
        disk::clear(&self.config.target_path)
    }

    /// Write exactly `file_size` bytes; the last chunk may be short
    fn write_phase(&self, target: &mut TargetFile, buffer: &[u8]) -> Result<u64> {
        let total = self.config.file_size;
        let mut progress = PhaseProgress::new(self.progress_tx.as_ref(), Phase::Write, total);
        let mut written = 0u64;

        while written < total {
            self.check_cancelled()?;
            let len = (total - written).min(buffer.len() as u64) as usize;
            target.write_chunk(&buffer[..len])?;
            written += len as u64;
            progress.report(written);
        }

        progress.finish(written);
        Ok(written)
    }

    /// Read the file back chunk by chunk, stopping early at end of file
    fn read_phase(&self, target: &mut TargetFile, buffer: &mut [u8]) -> Result<u64> {
        let total = self.config.file_size;
        let mut progress = PhaseProgress::new(self.progress_tx.as_ref(), Phase::Read, total);
        let mut read = 0u64;

        while read < total {
            self.check_cancelled()?;
            let len = (total - read).min(buffer.len() as u64) as usize;
            let n = target.read_chunk(&mut buffer[..len])?;
            if n == 0 {
                log::warn!(
                    "end of file reached at {} bytes (expected {})",
                    read,
                    total
                );
                break;
            }
            read += n as u64;
            progress.report(read);
        }

        progress.finish(read);
        Ok(read)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            log::debug!("cancellation requested");
            return Err(DiskSpeedError::Aborted);
        }
        Ok(())
    }
}

/// Throttled progress sender for one phase
struct PhaseProgress<'a> {
    tx: Option<&'a mpsc::Sender<ProgressUpdate>>,
    phase: Phase,
    total: u64,
    last_sent: Instant,
}

impl<'a> PhaseProgress<'a> {
    fn new(tx: Option<&'a mpsc::Sender<ProgressUpdate>>, phase: Phase, total: u64) -> Self {
        let progress = Self {
            tx,
            phase,
            total,
            last_sent: Instant::now(),
        };
        progress.send(0);
        progress
    }

    fn report(&mut self, bytes: u64) {
        if self.last_sent.elapsed() >= PROGRESS_INTERVAL {
            self.send(bytes);
            self.last_sent = Instant::now();
        }
    }

    fn finish(&self, bytes: u64) {
        self.send(bytes);
    }

    fn send(&self, bytes: u64) {
        if let Some(tx) = self.tx {
            // A full or closed channel only costs a progress line
            let _ = tx.try_send(ProgressUpdate {
                phase: self.phase,
                bytes_processed: bytes,
                total_bytes: self.total,
            });
        }
    }
}
