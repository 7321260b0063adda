//! The editing session.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::error::{Error, Result};
use crate::model::{Document, Mark, Node, OutlineEntry, Page, TextRun};
use crate::outline::{self, AnchorRegistry};
use crate::paginate::{HeightMeasurer, PaginationResult, PaginationWorker, Paginator};
use crate::parser::{parse_fragment, parse_html, ParseOptions};
use crate::render::{to_html, CleanupPipeline, CleanupPreset, HtmlOptions};
use crate::reorder::{self, Direction, Section};
use crate::services::AssistService;
use crate::templates;

use super::{ChangeEvent, EditOp, Versioned};

/// An editing session owning a single document.
///
/// All mutations go through [`Editor::apply`], which validates the edit,
/// bumps the version counter and notifies subscribers. The outline and the
/// heading anchors are re-derived synchronously after every edit; pages are
/// derived on request and tagged with the version they were computed for.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    version: u64,
    subscribers: Vec<Sender<ChangeEvent>>,
    outline: Versioned<Vec<OutlineEntry>>,
    anchors: AnchorRegistry,
    pages: Versioned<Vec<Page>>,
}

impl Editor {
    /// Start a session on `doc` at version 0.
    pub fn new(doc: Document) -> Self {
        let mut editor = Self {
            doc,
            version: 0,
            subscribers: Vec::new(),
            outline: Versioned::default(),
            anchors: AnchorRegistry::new(),
            pages: Versioned::default(),
        };
        editor.refresh_outline();
        editor
    }

    /// Start a session on parsed HTML.
    pub fn from_html(html: &str, options: &ParseOptions) -> Result<Self> {
        Ok(Self::new(parse_html(html, options)?))
    }

    /// Current document tree.
    pub fn tree(&self) -> &Document {
        &self.doc
    }

    /// End the session and take the document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Current document version; bumped once per successful edit.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Serialized content stream used for pagination.
    pub fn serialize(&self) -> String {
        to_html(&self.doc, &HtmlOptions::default())
    }

    /// Serialize with custom HTML options.
    pub fn serialize_with(&self, options: &HtmlOptions) -> String {
        to_html(&self.doc, options)
    }

    /// Plain text of the whole document.
    pub fn plain_text(&self) -> String {
        self.doc.plain_text()
    }

    /// Subscribe to change events.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Replace the blocks between two top-level boundaries.
    pub fn replace_range(&mut self, from: usize, to: usize, fragment: Vec<Node>) -> Result<u64> {
        self.apply(EditOp::ReplaceRange { from, to, fragment })
    }

    /// Apply an edit and return the new version.
    ///
    /// A failed edit leaves both the document and the version unchanged.
    pub fn apply(&mut self, op: EditOp) -> Result<u64> {
        let edit = op.kind();
        match op {
            EditOp::InsertText { pos, text } => self.doc.insert_text(pos, &text)?,
            EditOp::DeleteRange { from, to } => self.doc.delete_range(from, to)?,
            EditOp::ToggleMark { from, to, mark } => self.doc.toggle_mark(from, to, mark)?,
            EditOp::SetBlockType { pos, kind } => self.doc.set_block_type(pos, kind)?,
            EditOp::InsertHtml { pos, html } => {
                let nodes = parse_fragment(&html, &ParseOptions::default())?;
                self.doc.replace_range(pos, pos, nodes)?
            }
            EditOp::InsertPageBreak { pos } => self.doc.insert_block(pos, Node::page_break())?,
            EditOp::ReplaceRange { from, to, fragment } => {
                self.doc.replace_range(from, to, fragment)?
            }
            EditOp::ReplaceText { from, to, runs } => self.doc.replace_text(from, to, runs)?,
        }

        self.version += 1;
        log::debug!("Applied {} -> version {}", edit, self.version);
        self.refresh_outline();
        self.notify(ChangeEvent {
            version: self.version,
            kind: edit,
            size: self.doc.content_size(),
        });
        Ok(self.version)
    }

    fn refresh_outline(&mut self) {
        let entries = outline::extract(&self.doc);
        self.anchors.assign(&entries);
        self.outline.offer(self.version, entries);
    }

    fn notify(&mut self, event: ChangeEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            log::debug!("Pruned {} disconnected subscriber(s)", dropped);
        }
    }

    /// Outline of the current version.
    pub fn outline(&self) -> &[OutlineEntry] {
        self.outline.get()
    }

    /// Anchors assigned to the current outline.
    pub fn anchors(&self) -> &AnchorRegistry {
        &self.anchors
    }

    /// Sections of the current outline.
    pub fn sections(&self) -> Vec<Section> {
        reorder::sections(&self.doc, self.outline())
    }

    /// Move the section at outline `index` one step in `direction`.
    pub fn move_section(&mut self, index: usize, direction: Direction) -> Result<u64> {
        reorder::move_section(self, index, direction)
    }

    /// Insert a page break at `pos`.
    pub fn insert_page_break(&mut self, pos: usize) -> Result<u64> {
        self.apply(EditOp::InsertPageBreak { pos })
    }

    /// Insert a built-in clause template at a top-level boundary.
    pub fn insert_template(&mut self, name: &str, pos: usize) -> Result<u64> {
        let template = templates::find(name)?;
        self.apply(EditOp::InsertHtml {
            pos,
            html: template.html.to_string(),
        })
    }

    /// Accept a rewrite suggestion for `from..to`.
    ///
    /// The original text stays in place marked as deleted and the suggestion
    /// follows it marked as inserted. The range must lie inside one
    /// textblock.
    pub fn accept_suggestion(&mut self, from: usize, to: usize, suggestion: &str) -> Result<u64> {
        self.doc.check_range(from, to)?;
        let (start, end) = match (self.doc.resolve_text(from), self.doc.resolve_text(to)) {
            (Some(start), Some(end)) if start.path == end.path => (start, end),
            _ => {
                return Err(Error::Range(format!(
                    "{}..{} is not inside a single textblock",
                    from, to
                )))
            }
        };
        let node = self
            .doc
            .node_at(&start.path)
            .ok_or_else(|| Error::Range(format!("no textblock at position {}", from)))?;

        let mut runs: Vec<TextRun> = node
            .slice_runs(start.offset, end.offset)
            .into_iter()
            .map(|mut run| {
                run.style.set(Mark::Inserted, false);
                run.style.set(Mark::Deleted, true);
                run
            })
            .collect();
        if !suggestion.is_empty() {
            runs.push(TextRun::marked(suggestion, Mark::Inserted));
        }
        self.apply(EditOp::ReplaceText { from, to, runs })
    }

    /// Call an external service with the document's cleaned plain text.
    ///
    /// Any failure is logged and reported as [`Error::ExternalService`]; the
    /// document is never touched.
    pub fn consult<S, T, F>(&self, service: &S, call: F) -> Result<T>
    where
        S: AssistService + ?Sized,
        F: FnOnce(&S, &str) -> Result<T>,
    {
        let text = CleanupPipeline::from_preset(CleanupPreset::Standard).process(&self.plain_text());
        guard(call(service, &text))
    }

    /// Ask a service for a rewrite of the text between two positions.
    pub fn suggest_rewrite<S>(&self, service: &S, from: usize, to: usize) -> Result<String>
    where
        S: AssistService + ?Sized,
    {
        let text = self.doc.text_between(from, to)?;
        guard(service.suggest_rewrite(&text))
    }

    /// Pages of the last accepted pagination.
    pub fn pages(&self) -> &[Page] {
        self.pages.get()
    }

    /// Version the current pages were computed for.
    pub fn pages_version(&self) -> u64 {
        self.pages.version()
    }

    /// Check if the pages belong to the current version.
    pub fn pages_current(&self) -> bool {
        self.pages.is_current(self.version)
    }

    /// Paginate the current version synchronously.
    ///
    /// Returns `true` when the pages changed.
    pub fn paginate(&mut self, paginator: &mut Paginator, measurer: Option<&dyn HeightMeasurer>) -> bool {
        let changed = paginator.update(&self.serialize(), measurer);
        self.pages.offer(self.version, paginator.pages().to_vec());
        changed
    }

    /// Hand the current version to a background worker.
    pub fn request_pages(&self, worker: &PaginationWorker) -> Result<()> {
        worker.submit(self.version, self.serialize())
    }

    /// Accept worker output if it belongs to the current version.
    pub fn accept_pages(&mut self, result: PaginationResult) -> bool {
        if result.version != self.version {
            log::debug!(
                "Discarding pages for version {} (document is at {})",
                result.version,
                self.version
            );
            return false;
        }
        self.pages.offer(result.version, result.pages)
    }

    /// Drain finished worker results, keeping only current ones.
    pub fn poll_pages(&mut self, worker: &PaginationWorker) -> bool {
        let mut accepted = false;
        while let Some(result) = worker.try_recv() {
            accepted |= self.accept_pages(result);
        }
        accepted
    }
}

fn guard<T>(result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        log::warn!("External service call failed: {}", e);
        match e {
            Error::ExternalService(_) => e,
            other => Error::ExternalService(other.to_string()),
        }
    })
}
