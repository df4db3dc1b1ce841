//! One editing session: draft, question and everything derived from them.
//!
//! Derived state is never patched in place. Each event recomputes the preview
//! from the draft and the latest remote snapshot and replaces the old value.

use tracing::{debug, warn};

use crate::ast::Preview;
use crate::backend::{Backend, BackendError, ExecRequest, ExecResponse, ResultView};
use crate::parser::Scan;
use crate::preview::{PreviewMerger, RemoteSnapshot};
use crate::roadmap::Roadmap;

/// A ghost-row fetch handed to the collaborator.
///
/// Responses are matched back by `request`; only the newest ticket for the
/// still-previewed table is merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub request: u64,
    pub table: String,
}

impl FetchTicket {
    pub fn query(&self) -> ExecRequest {
        ExecRequest::select_all(&self.table)
    }
}

/// Result of running the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Rows of the affected table before a mutating statement ran.
    pub before: Option<RemoteSnapshot>,
    pub outcome: ResultView,
    /// Rows of the affected table after a mutating statement ran.
    pub after: Option<RemoteSnapshot>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    merger: PreviewMerger,
    draft: String,
    question: String,
    roadmap: Roadmap,
    preview: Preview,
    remote: Option<RemoteSnapshot>,
    issued: u64,
    message: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn preview(&self) -> &Preview {
        &self.preview
    }

    pub fn roadmap(&self) -> &Roadmap {
        &self.roadmap
    }

    pub fn remote(&self) -> Option<&RemoteSnapshot> {
        self.remote.as_ref()
    }

    /// Last user-visible message from running a statement.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
        self.recompute();
    }

    pub fn ask(&mut self, question: impl Into<String>) {
        self.question = question.into();
        self.roadmap = Roadmap::for_question(&self.question);
        debug!(category = ?self.roadmap.category, steps = self.roadmap.steps.len(), "roadmap generated");
    }

    /// Roadmap step completion against the current draft.
    pub fn progress(&self) -> Vec<bool> {
        self.roadmap.progress(&self.draft)
    }

    fn recompute(&mut self) {
        self.preview = self
            .merger
            .derive(&self.draft, &self.preview, self.remote.as_ref());
    }

    /// Ticket for fetching existing rows of the previewed table, if there is one.
    pub fn snapshot_request(&mut self) -> Option<FetchTicket> {
        let table = self.preview.table_name()?.to_string();
        self.issued += 1;
        Some(FetchTicket {
            request: self.issued,
            table,
        })
    }

    /// Merge a ghost-row response. Returns false when the response was stale
    /// and has been discarded.
    pub fn deliver_snapshot(
        &mut self,
        ticket: &FetchTicket,
        result: Result<ExecResponse, BackendError>,
    ) -> bool {
        let current = self
            .preview
            .table_name()
            .is_some_and(|t| t.eq_ignore_ascii_case(&ticket.table));
        if ticket.request != self.issued || !current {
            debug!(
                request = ticket.request,
                table = %ticket.table,
                "discarding stale snapshot response"
            );
            return false;
        }

        self.remote = Some(snapshot_from(&ticket.table, result));
        self.recompute();
        true
    }

    /// Run the draft through `backend`.
    ///
    /// A mutating statement on a detected table is bracketed by a fetch of
    /// that table before and after it; the three requests run one after the
    /// other. Nothing is retried.
    pub fn submit<B: Backend + ?Sized>(&mut self, backend: &mut B) -> Submission {
        let mut pending = self.begin_submit();
        while let Some(request) = pending.next_request() {
            pending.accept(backend.execute(&request));
        }
        self.finish_submit(pending)
    }

    /// Plan a submission of the current draft. The caller sends each
    /// `next_request` in turn and hands back its answer with `accept`.
    pub fn begin_submit(&self) -> PendingSubmit {
        let query = self.draft.trim().to_string();
        if query.is_empty() {
            return PendingSubmit {
                query,
                table: None,
                before: None,
                outcome: Some(ResultView::Failed(
                    "Nothing to run: the draft is empty".to_string(),
                )),
                after: None,
            };
        }

        let table = {
            let scan = Scan::new(&query);
            if scan.is_mutating() {
                scan.table_reference()
            } else {
                None
            }
        };
        debug!(query = %query, table = ?table, "submitting statement");

        PendingSubmit {
            query,
            table,
            before: None,
            outcome: None,
            after: None,
        }
    }

    /// Apply a finished submission to the session.
    pub fn finish_submit(&mut self, pending: PendingSubmit) -> Submission {
        let outcome = pending
            .outcome
            .unwrap_or_else(|| ResultView::Failed("The statement was not answered".to_string()));
        self.message = Some(outcome.summary());

        if !pending.query.is_empty() {
            // Any ghost fetch still in flight predates this statement.
            self.issued += 1;
            if let Some(after) = &pending.after {
                self.remote = Some(after.clone());
            }
            self.recompute();
        }

        Submission {
            before: pending.before,
            outcome,
            after: pending.after,
        }
    }
}

/// A submission in progress: optional pre-fetch, the statement, optional
/// refresh, answered strictly in that order.
#[derive(Debug, Clone)]
pub struct PendingSubmit {
    query: String,
    table: Option<String>,
    before: Option<RemoteSnapshot>,
    outcome: Option<ResultView>,
    after: Option<RemoteSnapshot>,
}

impl PendingSubmit {
    /// The request to send next, or `None` once every answer is in.
    pub fn next_request(&self) -> Option<ExecRequest> {
        match (&self.table, &self.outcome) {
            (Some(table), None) if self.before.is_none() => Some(ExecRequest::select_all(table)),
            (_, None) => Some(ExecRequest::new(self.query.as_str())),
            (Some(table), Some(_)) if self.after.is_none() => Some(ExecRequest::select_all(table)),
            _ => None,
        }
    }

    /// Record the answer to the request last returned by `next_request`.
    pub fn accept(&mut self, result: Result<ExecResponse, BackendError>) {
        if self.outcome.is_none() {
            match &self.table {
                Some(table) if self.before.is_none() => {
                    self.before = Some(snapshot_from(table, result));
                }
                _ => self.outcome = Some(ResultView::from_result(result)),
            }
        } else if let Some(table) = self.table.as_deref().filter(|_| self.after.is_none()) {
            self.after = Some(snapshot_from(table, result));
        } else {
            debug!("ignoring answer to a finished submission");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.next_request().is_none()
    }
}

/// Rows of a fetch; failures leave the slice empty.
fn snapshot_from(table: &str, result: Result<ExecResponse, BackendError>) -> RemoteSnapshot {
    match result {
        Ok(response) if response.is_success() => RemoteSnapshot {
            table: table.to_string(),
            rows: response.data,
        },
        Ok(response) => {
            warn!(table, message = ?response.message, "snapshot fetch returned an error");
            RemoteSnapshot::empty(table)
        }
        Err(e) => {
            warn!(table, error = %e, "snapshot fetch failed");
            RemoteSnapshot::empty(table)
        }
    }
}
