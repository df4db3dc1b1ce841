use std::collections::HashMap;

use pretty_assertions::assert_eq;

use draftlens::ast::RowOrigin;
use draftlens::backend::{Backend, BackendError, ExecRequest, ExecResponse, ResultView, Status};
use draftlens::render::{self, RenderOptions};
use draftlens::roadmap::IntentCategory;
use draftlens::session::Session;

/// In-memory stand-in for the execution endpoint.
#[derive(Default)]
struct FakeBackend {
    tables: HashMap<String, Vec<Vec<String>>>,
    log: Vec<String>,
    fail_statements: bool,
}

impl FakeBackend {
    fn with_students() -> Self {
        let mut tables = HashMap::new();
        tables.insert(
            "students".to_string(),
            vec![vec!["1", "Ada", "20", "91"], vec!["2", "Bo", "19", "77"]]
                .into_iter()
                .map(|r| r.into_iter().map(String::from).collect())
                .collect(),
        );
        Self {
            tables,
            ..Self::default()
        }
    }
}

impl Backend for FakeBackend {
    fn execute(&mut self, request: &ExecRequest) -> Result<ExecResponse, BackendError> {
        self.log.push(request.query.clone());

        if let Some(table) = request.query.strip_prefix("SELECT * FROM ") {
            return match self.tables.get(table) {
                Some(rows) => Ok(ExecResponse {
                    status: Status::Success,
                    message: None,
                    columns: vec!["id".into(), "name".into(), "age".into(), "score".into()],
                    data: rows.clone(),
                }),
                None => Ok(ExecResponse {
                    status: Status::Error,
                    message: Some(format!("no such table: {table}")),
                    columns: vec![],
                    data: vec![],
                }),
            };
        }

        if self.fail_statements {
            return Err(BackendError::Transport("connection reset".into()));
        }

        if let Some(table) = request.query.strip_prefix("DROP TABLE IF EXISTS ") {
            self.tables.remove(table);
        }

        if let Some(rest) = request.query.strip_prefix("INSERT INTO students VALUES ") {
            let row = draftlens::parser::extract_rows(&format!("VALUES {rest}"));
            self.tables
                .entry("students".into())
                .or_default()
                .extend(row);
        }

        Ok(ExecResponse {
            status: Status::Success,
            message: Some("Command executed successfully!".into()),
            columns: vec![],
            data: vec![],
        })
    }
}

#[test]
fn test_mutating_statement_is_bracketed_by_fetches() {
    let mut backend = FakeBackend::with_students();
    let mut session = Session::new();
    session.set_draft("INSERT INTO students VALUES (3, 'Cy', 21, 88)");

    let submission = session.submit(&mut backend);

    assert_eq!(
        backend.log,
        vec![
            "SELECT * FROM students",
            "INSERT INTO students VALUES (3, 'Cy', 21, 88)",
            "SELECT * FROM students",
        ]
    );
    assert_eq!(submission.before.map(|s| s.rows.len()), Some(2));
    assert_eq!(submission.after.map(|s| s.rows.len()), Some(3));
    assert_eq!(
        submission.outcome,
        ResultView::NoData {
            message: "Command executed successfully!".into()
        }
    );
    assert_eq!(session.message(), Some("Command executed successfully!"));

    let origins: Vec<_> = session.preview().rows.iter().map(|r| r.origin).collect();
    assert_eq!(
        origins,
        vec![
            RowOrigin::Existing,
            RowOrigin::Existing,
            RowOrigin::Existing,
            RowOrigin::Draft,
        ]
    );
}

#[test]
fn test_drop_if_exists_is_bracketed_by_fetches() {
    let mut backend = FakeBackend::with_students();
    let mut session = Session::new();
    session.set_draft("DROP TABLE IF EXISTS students");

    let submission = session.submit(&mut backend);

    assert_eq!(
        backend.log,
        vec![
            "SELECT * FROM students",
            "DROP TABLE IF EXISTS students",
            "SELECT * FROM students",
        ]
    );
    assert_eq!(submission.before.map(|s| s.rows.len()), Some(2));
    assert_eq!(submission.after.map(|s| s.rows), Some(vec![]));
    assert!(session.preview().is_empty());
}

#[test]
fn test_select_sends_only_the_statement() {
    let mut backend = FakeBackend::with_students();
    let mut session = Session::new();
    session.set_draft("  SELECT * FROM students  ");

    let submission = session.submit(&mut backend);

    assert_eq!(backend.log, vec!["SELECT * FROM students"]);
    assert!(submission.before.is_none());
    assert!(submission.after.is_none());
    match submission.outcome {
        ResultView::Rows { rows, .. } => assert_eq!(rows.len(), 2),
        other => panic!("expected rows, got {other:?}"),
    }
}

#[test]
fn test_failed_statement_is_reported_not_retried() {
    let mut backend = FakeBackend {
        fail_statements: true,
        ..FakeBackend::with_students()
    };
    let mut session = Session::new();
    session.set_draft("DELETE FROM students WHERE id = 1");

    let submission = session.submit(&mut backend);

    assert_eq!(backend.log.len(), 3);
    assert!(submission.outcome.is_failure());
    assert_eq!(session.message(), Some("Request failed: connection reset"));
}

#[test]
fn test_create_on_missing_table_has_empty_before() {
    let mut backend = FakeBackend::default();
    let mut session = Session::new();
    session.set_draft("CREATE TABLE pets (id INT, name TEXT)");

    let submission = session.submit(&mut backend);

    assert_eq!(submission.before.map(|s| s.rows), Some(vec![]));
    assert!(!submission.outcome.is_failure());
    assert_eq!(session.preview().table_name(), Some("pets"));
}

#[test]
fn test_empty_draft_sends_nothing() {
    let mut backend = FakeBackend::default();
    let mut session = Session::new();
    session.set_draft("   ");

    let submission = session.submit(&mut backend);

    assert!(backend.log.is_empty());
    assert!(submission.outcome.is_failure());
}

#[test]
fn test_stale_snapshot_after_submit_is_discarded() {
    let mut backend = FakeBackend::with_students();
    let mut session = Session::new();
    session.set_draft("UPDATE students SET score = 100");
    let ticket = session.snapshot_request().unwrap();

    session.submit(&mut backend);
    let stale = backend.execute(&ticket.query());

    assert!(!session.deliver_snapshot(&ticket, stale));
}

#[test]
fn test_live_typing_walkthrough() {
    let mut session = Session::new();
    session.ask("Create a new table for pets");
    assert_eq!(session.roadmap().category, Some(IntentCategory::CreateTable));

    let mut progress = Vec::new();
    for draft in [
        "CREATE",
        "CREATE TABLE pets",
        "CREATE TABLE IF NOT EXISTS pets (id INT,",
        "CREATE TABLE IF NOT EXISTS pets (id INT, name VARCHAR(20))",
    ] {
        session.set_draft(draft);
        progress.push(session.progress());
    }

    assert_eq!(
        progress,
        vec![
            vec![false, false, false],
            vec![true, false, false],
            vec![true, true, false],
            vec![true, true, true],
        ]
    );

    let text = render::preview_table(session.preview(), &RenderOptions::default());
    assert_eq!(
        text,
        "pets (from draft)\n  | id     | name\n  | number | text\n--+--------+-----\n"
    );
}
