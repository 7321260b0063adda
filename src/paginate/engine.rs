//! Two-phase pagination: manual split, then greedy overflow split.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::Page;

use super::measure::{measure_checked, HeightMeasurer};
use super::segment::{split_blocks, split_manual};
use super::PaginateOptions;

/// Why a measured pagination run did not produce pages.
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// A newer document version superseded the run
    Cancelled,
    /// The measurer failed
    Unavailable(Error),
}

/// Paginate serialized content.
///
/// Without a measurer, or when any block cannot be measured, every manual
/// segment becomes exactly one page.
pub fn paginate(
    html: &str,
    measurer: Option<&dyn HeightMeasurer>,
    options: &PaginateOptions,
) -> Vec<Page> {
    match measurer {
        Some(measurer) => match paginate_measured(html, measurer, options, &|| false) {
            Ok(pages) => pages,
            Err(Interrupt::Unavailable(e)) => {
                log::warn!("Falling back to manual page breaks: {}", e);
                paginate_manual(html)
            }
            // never cancelled without a cancellation signal
            Err(Interrupt::Cancelled) => paginate_manual(html),
        },
        None => paginate_manual(html),
    }
}

/// Paginate on manual breaks only.
pub fn paginate_manual(html: &str) -> Vec<Page> {
    split_manual(html)
        .into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let mut page = Page::new(i as u32 + 1, i, segment);
            page.block_count = split_blocks(segment).len();
            page
        })
        .collect()
}

/// Paginate with height measurement, checking `cancelled` between blocks.
pub(crate) fn paginate_measured(
    html: &str,
    measurer: &dyn HeightMeasurer,
    options: &PaginateOptions,
    cancelled: &(dyn Fn() -> bool + Sync),
) -> std::result::Result<Vec<Page>, Interrupt> {
    let capacity = options.capacity();
    let mut pages = Vec::new();

    for (segment_index, segment) in split_manual(html).into_iter().enumerate() {
        let blocks = split_blocks(segment);
        let heights = measure_blocks(&blocks, measurer, options.parallel, cancelled)?;
        let first = pages.len();
        layout_segment(&blocks, &heights, capacity, segment_index, first, &mut pages);
    }

    log::debug!(
        "Paginated {} bytes into {} pages (capacity {})",
        html.len(),
        pages.len(),
        capacity
    );
    Ok(pages)
}

fn measure_blocks(
    blocks: &[&str],
    measurer: &dyn HeightMeasurer,
    parallel: bool,
    cancelled: &(dyn Fn() -> bool + Sync),
) -> std::result::Result<Vec<f32>, Interrupt> {
    let measure_one = |block: &&str| {
        if cancelled() {
            return Err(Interrupt::Cancelled);
        }
        measure_checked(measurer, block).map_err(Interrupt::Unavailable)
    };

    if parallel {
        blocks.par_iter().map(measure_one).collect()
    } else {
        blocks.iter().map(measure_one).collect()
    }
}

/// Greedy overflow split of one manual segment.
///
/// A block starts a new page when `h + b > capacity` and the current page
/// already holds a block, so a block that exactly fills the remaining space
/// stays. An oversized block therefore always sits alone on its page.
fn layout_segment(
    blocks: &[&str],
    heights: &[f32],
    capacity: f32,
    segment: usize,
    first: usize,
    pages: &mut Vec<Page>,
) {
    let mut number = pages.len() as u32 + 1;
    let mut current = Page::new(number, segment, String::new());
    let mut height = 0.0f32;

    for (block, &b) in blocks.iter().zip(heights) {
        if current.block_count > 0 && height + b > capacity {
            current.height = Some(height);
            pages.push(current);
            number += 1;
            current = Page::new(number, segment, String::new());
            height = 0.0;
        }
        current.content.push_str(block);
        current.block_count += 1;
        height += b;
    }

    current.height = Some(height);
    pages.push(current);

    let oversized = pages[first..]
        .iter()
        .filter(|p| p.height.is_some_and(|h| h > capacity))
        .count();
    if oversized > 0 {
        log::debug!(
            "Segment {}: {} page(s) hold a block taller than the page",
            segment,
            oversized
        );
    }
}

/// Measure-free check that pages reproduce the content they were cut from.
pub fn pages_round_trip(html: &str, pages: &[Page]) -> bool {
    let joined: String = pages.iter().map(|p| p.content.as_str()).collect();
    joined == super::segment::strip_breaks(html)
}

/// Paginator that remembers its previous output.
///
/// The cache only serves change detection: every update recomputes the
/// pages from scratch.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    options: PaginateOptions,
    pages: Vec<Page>,
    runs: u64,
}

impl Paginator {
    /// Create a paginator with the given options.
    pub fn new(options: PaginateOptions) -> Self {
        Self {
            options,
            pages: Vec::new(),
            runs: 0,
        }
    }

    /// Pagination options in use.
    pub fn options(&self) -> &PaginateOptions {
        &self.options
    }

    /// Recompute pages for `html`.
    ///
    /// Returns `true` when the pages differ from the previous output.
    pub fn update(&mut self, html: &str, measurer: Option<&dyn HeightMeasurer>) -> bool {
        let pages = paginate(html, measurer, &self.options);
        self.store(pages)
    }

    /// Store pages computed elsewhere, reporting whether they changed.
    pub fn store(&mut self, pages: Vec<Page>) -> bool {
        self.runs += 1;
        if self.runs > 1 && pages == self.pages {
            return false;
        }
        self.pages = pages;
        true
    }

    /// Pages from the last update.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Number of pages from the last update.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Convenience wrapper returning an error instead of falling back.
pub fn paginate_strict(
    html: &str,
    measurer: &dyn HeightMeasurer,
    options: &PaginateOptions,
) -> Result<Vec<Page>> {
    paginate_measured(html, measurer, options, &|| false).map_err(|e| match e {
        Interrupt::Unavailable(e) => e,
        Interrupt::Cancelled => Error::Other("pagination cancelled".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PAGE_BREAK_HTML;

    fn by_text(block: &str) -> Option<f32> {
        // "<p>600</p>" measures 600
        let start = block.find('>')? + 1;
        let end = block[start..].find('<')? + start;
        block[start..end].trim().parse().ok()
    }

    fn options(capacity: f32) -> PaginateOptions {
        PaginateOptions::new().with_capacity(capacity)
    }

    fn contents(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.content.as_str()).collect()
    }

    #[test]
    fn test_greedy_three_oversized_pairs() {
        let html = "<p>600</p><p>600</p><p>600</p>";
        let pages = paginate(html, Some(&by_text), &options(1050.0));
        assert_eq!(contents(&pages), vec!["<p>600</p>", "<p>600</p>", "<p>600</p>"]);
        assert_eq!(pages[2].number, 3);
        assert_eq!(pages[0].height, Some(600.0));
    }

    #[test]
    fn test_exact_fit_stays_on_page() {
        let html = "<p>500</p><p>550</p><p>1</p>";
        let pages = paginate(html, Some(&by_text), &options(1050.0));
        assert_eq!(contents(&pages), vec!["<p>500</p><p>550</p>", "<p>1</p>"]);
        assert_eq!(pages[0].height, Some(1050.0));
    }

    #[test]
    fn test_oversized_block_alone() {
        let html = "<p>100</p><p>2000</p><p>100</p>";
        let pages = paginate(html, Some(&by_text), &options(1050.0));
        assert_eq!(
            contents(&pages),
            vec!["<p>100</p>", "<p>2000</p>", "<p>100</p>"]
        );
        assert_eq!(pages[1].block_count, 1);
    }

    #[test]
    fn test_manual_segments_under_capacity() {
        let html = format!("<p>100</p><p>200</p>{}<p>300</p>", PAGE_BREAK_HTML);
        let pages = paginate(&html, Some(&by_text), &options(1050.0));
        assert_eq!(contents(&pages), vec!["<p>100</p><p>200</p>", "<p>300</p>"]);
        assert_eq!(pages[1].segment, 1);
        assert!(pages_round_trip(&html, &pages));
    }

    #[test]
    fn test_empty_segment_yields_empty_page() {
        let html = format!("<p>1</p>{}{}<p>2</p>", PAGE_BREAK_HTML, PAGE_BREAK_HTML);
        let pages = paginate(&html, Some(&by_text), &options(1050.0));
        assert_eq!(pages.len(), 3);
        assert!(pages[1].is_empty());
        assert_eq!(pages[1].height, Some(0.0));
    }

    #[test]
    fn test_fallback_to_manual_when_unavailable() {
        let html = format!("<p>100</p><p>x</p>{}<p>300</p>", PAGE_BREAK_HTML);
        let pages = paginate(&html, Some(&by_text), &options(150.0));
        assert_eq!(contents(&pages), vec!["<p>100</p><p>x</p>", "<p>300</p>"]);
        assert!(pages.iter().all(|p| !p.is_measured()));
        assert!(paginate_strict(&html, &by_text, &options(150.0)).is_err());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let html: String = (0..50).map(|i| format!("<p>{}</p>", 100 + i * 7)).collect();
        let sequential = paginate(&html, Some(&by_text), &options(1050.0));
        let parallel = paginate(&html, Some(&by_text), &options(1050.0).with_parallel(true));
        assert_eq!(sequential, parallel);
        assert!(pages_round_trip(&html, &parallel));
    }

    #[test]
    fn test_cancelled_run() {
        let result = paginate_measured("<p>1</p>", &by_text, &options(10.0), &|| true);
        assert!(matches!(result, Err(Interrupt::Cancelled)));
    }

    #[test]
    fn test_paginator_reports_changes() {
        let mut paginator = Paginator::new(options(1050.0));
        assert!(paginator.update("<p>100</p>", Some(&by_text)));
        assert!(!paginator.update("<p>100</p>", Some(&by_text)));
        assert!(paginator.update("<p>200</p>", Some(&by_text)));
        assert_eq!(paginator.page_count(), 1);
    }
}
