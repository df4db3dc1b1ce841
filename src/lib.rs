pub mod ast;
pub mod backend;
pub mod lexer;
pub mod parser;
pub mod preview;
pub mod registry;
pub mod render;
pub mod roadmap;
pub mod session;
pub mod types;

use wasm_bindgen::prelude::*;

use backend::{BackendError, ExecResponse};
use registry::SchemaRegistry;
use render::RenderOptions;
use roadmap::Roadmap;
use session::{FetchTicket, PendingSubmit, Session};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Table a draft operates on, if any.
#[wasm_bindgen(js_name = "detectTable")]
pub fn detect_table(draft: &str) -> Option<String> {
    parser::detect_table(draft)
}

/// Step descriptions of the checklist for a question.
#[wasm_bindgen(js_name = "roadmapFor")]
pub fn roadmap_for(question: &str) -> js_sys::Array {
    Roadmap::for_question(question)
        .steps
        .iter()
        .map(|step| JsValue::from_str(step.description))
        .collect()
}

/// Names of the tables the preview knows without a draft definition.
#[wasm_bindgen(js_name = "knownTables")]
pub fn known_tables() -> js_sys::Array {
    SchemaRegistry::new()
        .table_names()
        .map(JsValue::from_str)
        .collect()
}

/// Editor-facing session handle.
#[wasm_bindgen]
pub struct DraftSession {
    inner: Session,
    options: RenderOptions,
}

/// A pending ghost-row fetch; pass it back to `deliverSnapshot`.
#[wasm_bindgen]
pub struct SnapshotRequest {
    ticket: FetchTicket,
}

#[wasm_bindgen]
impl SnapshotRequest {
    #[wasm_bindgen(getter)]
    pub fn table(&self) -> String {
        self.ticket.table.clone()
    }

    /// Statement to send to the execution endpoint.
    #[wasm_bindgen(getter)]
    pub fn query(&self) -> String {
        self.ticket.query().query
    }
}

/// A submission being driven by the editor, one request at a time.
#[wasm_bindgen]
pub struct SubmitRun {
    pending: PendingSubmit,
}

#[wasm_bindgen]
impl SubmitRun {
    /// Statement to send next, or `undefined` when the run can be finished.
    #[wasm_bindgen(js_name = "nextQuery")]
    pub fn next_query(&self) -> Option<String> {
        self.pending.next_request().map(|request| request.query)
    }

    /// Hand back the JSON body answering `nextQuery`.
    pub fn accept(&mut self, json: &str) {
        self.pending.accept(ExecResponse::from_json(json));
    }

    /// Record that the request for `nextQuery` failed.
    pub fn fail(&mut self, reason: &str) {
        self.pending
            .accept(Err(BackendError::Transport(reason.to_string())));
    }
}

#[wasm_bindgen]
impl DraftSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Session::new(),
            options: RenderOptions::default(),
        }
    }

    #[wasm_bindgen(js_name = "setDraft")]
    pub fn set_draft(&mut self, draft: &str) {
        self.inner.set_draft(draft);
    }

    pub fn ask(&mut self, question: &str) {
        self.inner.ask(question);
    }

    #[wasm_bindgen(js_name = "previewText")]
    pub fn preview_text(&self) -> String {
        render::preview_table(self.inner.preview(), &self.options)
    }

    #[wasm_bindgen(js_name = "roadmapText")]
    pub fn roadmap_text(&self) -> String {
        render::checklist(self.inner.roadmap(), &self.inner.progress())
    }

    #[wasm_bindgen(js_name = "roadmapProgress")]
    pub fn roadmap_progress(&self) -> js_sys::Array {
        self.inner
            .progress()
            .into_iter()
            .map(JsValue::from_bool)
            .collect()
    }

    #[wasm_bindgen(js_name = "snapshotRequest")]
    pub fn snapshot_request(&mut self) -> Option<SnapshotRequest> {
        self.inner
            .snapshot_request()
            .map(|ticket| SnapshotRequest { ticket })
    }

    /// Merge the JSON body answering `request`. Returns false if it was stale.
    #[wasm_bindgen(js_name = "deliverSnapshot")]
    pub fn deliver_snapshot(&mut self, request: &SnapshotRequest, json: &str) -> bool {
        self.inner
            .deliver_snapshot(&request.ticket, ExecResponse::from_json(json))
    }

    #[wasm_bindgen(js_name = "beginSubmit")]
    pub fn begin_submit(&self) -> SubmitRun {
        SubmitRun {
            pending: self.inner.begin_submit(),
        }
    }

    /// Apply a completed run and return the rendered result.
    #[wasm_bindgen(js_name = "finishSubmit")]
    pub fn finish_submit(&mut self, run: SubmitRun) -> String {
        let submission = self.inner.finish_submit(run.pending);
        render::result_table(&submission.outcome, &self.options)
    }

    /// Message from the last submission.
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> Option<String> {
        self.inner.message().map(str::to_string)
    }

    /// Record that the fetch for `request` failed.
    #[wasm_bindgen(js_name = "failSnapshot")]
    pub fn fail_snapshot(&mut self, request: &SnapshotRequest, reason: &str) -> bool {
        let failure = Err(BackendError::Transport(reason.to_string()));
        self.inner.deliver_snapshot(&request.ticket, failure)
    }
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new()
    }
}
