//! Merge of registry knowledge, parsed schema, ghost rows and draft rows
//! into one renderable preview.
//!
//! Schema resolution, highest priority first:
//!
//! 1. a `CREATE TABLE` shape in the current draft
//! 2. the [`SchemaRegistry`] entry for the referenced table
//! 3. the previous preview's schema, when it describes the same table
//!
//! Without any of these, or when the draft drops a table, the preview is
//! empty so missing structure is visible instead of stale.

use tracing::trace;

use crate::ast::{Preview, PreviewRow, RowOrigin, SchemaOrigin, SchemaSnapshot};
use crate::parser::Scan;
use crate::registry::SchemaRegistry;

/// Rows of a table as last delivered by the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub table: String,
    pub rows: Vec<Vec<String>>,
}

impl RemoteSnapshot {
    pub fn empty(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            rows: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewMerger {
    registry: SchemaRegistry,
}

impl PreviewMerger {
    /// Derive the preview for `draft`. Pure: the result depends only on the arguments.
    pub fn derive(
        &self,
        draft: &str,
        previous: &Preview,
        remote: Option<&RemoteSnapshot>,
    ) -> Preview {
        let scan = Scan::new(draft);
        if scan.is_destructive() {
            trace!("draft drops a table, clearing preview");
            return Preview::default();
        }

        let schema = match scan.create_table() {
            Some(def) => Some(SchemaSnapshot {
                table_name: def.name,
                columns: def.columns,
                origin: SchemaOrigin::Parsed,
            }),
            None => scan
                .table_reference()
                .and_then(|table| self.resolve(&table, previous)),
        };

        let Some(schema) = schema else {
            return Preview::default();
        };
        trace!(table = %schema.table_name, origin = ?schema.origin, "resolved preview schema");

        let width = schema.columns.len();
        let ghosts = remote
            .filter(|r| schema.describes(&r.table))
            .map(|r| r.rows.as_slice())
            .unwrap_or_default();

        let rows = ghosts
            .iter()
            .map(|cells| PreviewRow::fit(RowOrigin::Existing, cells, width))
            .chain(
                scan.row_tuples()
                    .iter()
                    .map(|cells| PreviewRow::fit(RowOrigin::Draft, cells, width)),
            )
            .collect();

        Preview {
            schema: Some(schema),
            rows,
        }
    }

    fn resolve(&self, table: &str, previous: &Preview) -> Option<SchemaSnapshot> {
        self.registry.lookup(table).or_else(|| {
            previous
                .schema
                .as_ref()
                .filter(|s| s.describes(table))
                .cloned()
        })
    }
}

/// Derive a preview with the default registry.
pub fn derive_preview(draft: &str, previous: &Preview, remote: Option<&RemoteSnapshot>) -> Preview {
    PreviewMerger::default().derive(draft, previous, remote)
}
