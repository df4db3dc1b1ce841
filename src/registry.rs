//! Offline column lists for the tables every learner database starts with.

use crate::ast::{ColumnDef, ColumnType, SchemaOrigin, SchemaSnapshot};

use ColumnType::{Number, Text};

const KNOWN_TABLES: &[(&str, &[(&str, ColumnType)])] = &[
    (
        "students",
        &[("id", Number), ("name", Text), ("age", Number), ("score", Number)],
    ),
    (
        "courses",
        &[("id", Number), ("title", Text), ("credits", Number)],
    ),
    (
        "enrollments",
        &[("student_id", Number), ("course_id", Number), ("grade", Text)],
    ),
];

/// Static schema lookup used before any parse or network result exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaRegistry;

impl SchemaRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Snapshot for a known table, matched case-insensitively.
    pub fn lookup(&self, table: &str) -> Option<SchemaSnapshot> {
        KNOWN_TABLES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(table))
            .map(|(name, columns)| SchemaSnapshot {
                table_name: name.to_string(),
                columns: columns
                    .iter()
                    .map(|&(col, typ)| ColumnDef::new(col, typ))
                    .collect(),
                origin: SchemaOrigin::Registry,
            })
    }

    pub fn table_names(&self) -> impl Iterator<Item = &'static str> {
        KNOWN_TABLES.iter().map(|(name, _)| *name)
    }
}
