//! Pagination engine.
//!
//! Pages are cut from the serialized content stream in two phases. The
//! stream is first split at every manual page-break marker; each resulting
//! segment is then filled greedily with top-level blocks until the next
//! block would overflow the page capacity.
//!
//! # Example
//!
//! ```
//! use folio::paginate::{paginate, PaginateOptions};
//!
//! let html = "<p>600</p><p>600</p><p>600</p>";
//! let measurer = |_: &str| Some(600.0_f32);
//! let options = PaginateOptions::new().with_capacity(1050.0);
//! let pages = paginate(html, Some(&measurer), &options);
//! assert_eq!(pages.len(), 3);
//! ```

mod engine;
mod measure;
mod options;
mod segment;
mod worker;

pub use engine::{pages_round_trip, paginate, paginate_manual, paginate_strict, Paginator};
pub use measure::{BlockMetrics, HeightMeasurer, TextMetricsMeasurer};
pub use options::{PageSize, PaginateOptions};
pub use segment::{count_breaks, split_blocks, split_manual, strip_breaks};
pub use worker::{PaginationJob, PaginationResult, PaginationWorker};
