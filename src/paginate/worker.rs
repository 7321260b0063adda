//! Background pagination worker.
//!
//! Measurement can be slow, so the editing session hands serialized content
//! to a worker thread and keeps accepting edits. Every job carries the
//! document version it was cut from. Submitting a newer version cancels the
//! in-flight job at its next block measurement, and queued jobs older than
//! the newest submission are skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::{Error, Result};
use crate::model::Page;

use super::engine::{paginate_manual, paginate_measured, Interrupt};
use super::{HeightMeasurer, PaginateOptions};

/// A pagination request for one document version.
#[derive(Debug, Clone)]
pub struct PaginationJob {
    /// Document version the content was serialized from
    pub version: u64,
    /// Serialized content
    pub html: String,
}

/// Pages computed for one document version.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationResult {
    /// Document version the pages belong to
    pub version: u64,
    /// Computed pages
    pub pages: Vec<Page>,
    /// `true` when measurement failed and only manual breaks were applied
    pub manual_only: bool,
}

/// Handle to a background pagination thread.
pub struct PaginationWorker {
    jobs: Option<Sender<PaginationJob>>,
    results: Receiver<PaginationResult>,
    latest: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl PaginationWorker {
    /// Spawn a worker measuring with `measurer`.
    pub fn spawn(measurer: Arc<dyn HeightMeasurer>, options: PaginateOptions) -> Self {
        let (job_tx, job_rx) = unbounded::<PaginationJob>();
        let (result_tx, result_rx) = unbounded::<PaginationResult>();
        let latest = Arc::new(AtomicU64::new(0));

        let worker_latest = Arc::clone(&latest);
        let handle = thread::spawn(move || {
            run(job_rx, result_tx, measurer, options, worker_latest);
        });

        Self {
            jobs: Some(job_tx),
            results: result_rx,
            latest,
            handle: Some(handle),
        }
    }

    /// Queue content for pagination.
    ///
    /// Any job for an older version stops at its next block measurement.
    pub fn submit(&self, version: u64, html: impl Into<String>) -> Result<()> {
        self.latest.fetch_max(version, Ordering::AcqRel);
        let jobs = self
            .jobs
            .as_ref()
            .ok_or_else(|| Error::Other("pagination worker is shut down".to_string()))?;
        jobs.send(PaginationJob {
            version,
            html: html.into(),
        })
        .map_err(|_| Error::Other("pagination worker stopped".to_string()))
    }

    /// Newest version submitted so far.
    pub fn latest_version(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }

    /// Take a finished result without blocking.
    pub fn try_recv(&self) -> Option<PaginationResult> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for a finished result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PaginationResult> {
        match self.results.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Wait for the result of the newest submitted version.
    ///
    /// Results for older versions are dropped on the way.
    pub fn wait_latest(&self, timeout: Duration) -> Option<PaginationResult> {
        let target = self.latest_version();
        while let Some(result) = self.recv_timeout(timeout) {
            if result.version >= target {
                return Some(result);
            }
            log::debug!("Dropping stale pages for version {}", result.version);
        }
        None
    }
}

impl Drop for PaginationWorker {
    fn drop(&mut self) {
        // Closing the job channel ends the worker loop.
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("Pagination worker panicked");
            }
        }
    }
}

fn run(
    jobs: Receiver<PaginationJob>,
    results: Sender<PaginationResult>,
    measurer: Arc<dyn HeightMeasurer>,
    options: PaginateOptions,
    latest: Arc<AtomicU64>,
) {
    while let Ok(mut job) = jobs.recv() {
        // Only the newest queued job matters.
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }
        if job.version < latest.load(Ordering::Acquire) {
            log::debug!("Skipping superseded pagination job {}", job.version);
            continue;
        }

        let version = job.version;
        let cancelled = || latest.load(Ordering::Acquire) > version;
        let result = match paginate_measured(&job.html, measurer.as_ref(), &options, &cancelled) {
            Ok(pages) => PaginationResult {
                version,
                pages,
                manual_only: false,
            },
            Err(Interrupt::Cancelled) => {
                log::debug!("Pagination of version {} cancelled", version);
                continue;
            }
            Err(Interrupt::Unavailable(e)) => {
                log::warn!("Falling back to manual page breaks: {}", e);
                PaginationResult {
                    version,
                    pages: paginate_manual(&job.html),
                    manual_only: true,
                }
            }
        };

        if results.send(result).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn fixed(height: f32) -> Arc<dyn HeightMeasurer> {
        Arc::new(move |_: &str| Some(height))
    }

    #[test]
    fn test_worker_paginates() {
        let worker = PaginationWorker::spawn(fixed(600.0), PaginateOptions::new().with_capacity(1050.0));
        worker.submit(1, "<p>a</p><p>b</p><p>c</p>").unwrap();

        let result = worker.wait_latest(Duration::from_secs(5)).unwrap();
        assert_eq!(result.version, 1);
        assert_eq!(result.pages.len(), 3);
        assert!(!result.manual_only);
    }

    #[test]
    fn test_worker_falls_back() {
        let unavailable: Arc<dyn HeightMeasurer> = Arc::new(|_: &str| None::<f32>);
        let worker = PaginationWorker::spawn(unavailable, PaginateOptions::new());
        worker.submit(3, "<p>a</p>").unwrap();

        let result = worker.wait_latest(Duration::from_secs(5)).unwrap();
        assert!(result.manual_only);
        assert_eq!(result.pages.len(), 1);
    }

    #[test]
    fn test_newer_version_wins() {
        // The first measurement blocks until the test releases it.
        let gate = Arc::new(Mutex::new(()));
        let held = gate.lock().unwrap();
        let measurer_gate = Arc::clone(&gate);
        let measurer: Arc<dyn HeightMeasurer> = Arc::new(move |_: &str| {
            let _guard = measurer_gate.lock().ok()?;
            Some(10.0_f32)
        });

        let worker = PaginationWorker::spawn(measurer, PaginateOptions::new());
        worker.submit(1, "<p>old</p><p>old</p>").unwrap();
        worker.submit(2, "<p>new</p>").unwrap();
        drop(held);

        let result = worker.wait_latest(Duration::from_secs(5)).unwrap();
        assert_eq!(result.version, 2);
        assert_eq!(result.pages[0].content, "<p>new</p>");
        assert_eq!(worker.latest_version(), 2);
    }
}
