use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    Text,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub typ: ColumnType,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, typ: ColumnType) -> Self {
        Self {
            name: name.into(),
            typ,
        }
    }
}

/// A table definition read from a `CREATE TABLE` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

/// Structural reading of a draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedStatement {
    CreateTableLike {
        table_name: String,
        columns: Vec<ColumnDef>,
    },
    Unrecognized,
}

/// Raw cell strings of one in-progress value group.
pub type RowTuple = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOrigin {
    Registry,
    Parsed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSnapshot {
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
    pub origin: SchemaOrigin,
}

impl SchemaSnapshot {
    pub fn describes(&self, table: &str) -> bool {
        self.table_name.eq_ignore_ascii_case(table)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// Persisted row delivered by a remote snapshot (a ghost row).
    Existing,
    /// Row typed into the current draft.
    Draft,
}

/// One preview cell; `Missing` marks a column the row has no value for yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Value(String),
    Missing,
}

impl Cell {
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.write_str(v),
            Self::Missing => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRow {
    pub origin: RowOrigin,
    pub cells: Vec<Cell>,
}

impl PreviewRow {
    /// Map raw cells onto `width` columns: extra cells are dropped, absent ones become `Missing`.
    pub fn fit(origin: RowOrigin, raw: &[String], width: usize) -> Self {
        let cells = (0..width)
            .map(|i| match raw.get(i) {
                Some(v) => Cell::Value(v.clone()),
                None => Cell::Missing,
            })
            .collect();
        Self { origin, cells }
    }
}

/// The renderable structural preview. Empty means no structure is shown.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preview {
    pub schema: Option<SchemaSnapshot>,
    pub rows: Vec<PreviewRow>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.schema.is_none() && self.rows.is_empty()
    }

    pub fn table_name(&self) -> Option<&str> {
        self.schema.as_ref().map(|s| s.table_name.as_str())
    }
}
