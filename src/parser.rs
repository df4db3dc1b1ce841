//! Best-effort structural reading of statement drafts.
//!
//! Nothing here rejects input. Every function returns whatever structure it
//! can find, and `None` or an empty list when a shape is absent.

use crate::ast::{ColumnDef, ParsedStatement, RowTuple, TableDef};
use crate::lexer::{tokenize, Lexeme, Token};
use crate::types::infer_type;

/// Leading words of table-level constraints inside a column list.
const CONSTRAINT_WORDS: &[&str] = &["PRIMARY", "FOREIGN", "CONSTRAINT", "KEY", "UNIQUE", "CHECK"];

/// Column clauses that end the data type portion of a column definition.
const COLUMN_CLAUSE_IDENTS: &[&str] = &["DEFAULT", "REFERENCES", "NULL", "COLLATE", "GENERATED"];

/// Words that start a statement which changes stored data or structure.
const MUTATING_IDENTS: &[&str] = &["ALTER", "TRUNCATE"];

/// A tokenized draft, so several readings can share one lexer pass.
pub struct Scan<'a> {
    source: &'a str,
    lexemes: Vec<Lexeme>,
}

impl<'a> Scan<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            lexemes: tokenize(source),
        }
    }

    pub fn lexemes(&self) -> &[Lexeme] {
        &self.lexemes
    }

    fn cursor(&self, pos: usize) -> Cursor<'_> {
        Cursor {
            lexemes: &self.lexemes,
            pos,
        }
    }

    /// First table referenced by a statement shape.
    ///
    /// Shapes are tried in priority order; the first shape found anywhere in
    /// the draft wins even if another shape appears earlier in the text.
    pub fn table_reference(&self) -> Option<String> {
        let shapes: [&[Token]; 5] = [
            &[Token::Insert, Token::Into],
            &[Token::From],
            &[Token::Update],
            &[Token::Table],
            &[Token::Delete, Token::From],
        ];

        shapes.iter().find_map(|shape| {
            (0..self.lexemes.len()).find_map(|start| {
                let mut cursor = self.cursor(start);
                if !cursor.eat_all(shape) {
                    return None;
                }
                if matches!(shape, [Token::Table]) {
                    cursor.skip_if_not_exists();
                    cursor.skip_if_exists();
                }
                cursor.table_name()
            })
        })
    }

    /// First `CREATE TABLE <name> ( ... )` shape in the draft.
    pub fn create_table(&self) -> Option<TableDef> {
        (0..self.lexemes.len()).find_map(|start| {
            let mut cursor = self.cursor(start);
            if !cursor.eat_all(&[Token::Create, Token::Table]) {
                return None;
            }
            cursor.skip_if_not_exists();
            let name = cursor.table_name()?;
            if !cursor.eat(&Token::LParen) {
                return None;
            }
            let columns = cursor
                .group_fragments()
                .into_iter()
                .filter_map(|fragment| self.column(fragment))
                .collect();
            Some(TableDef { name, columns })
        })
    }

    fn column(&self, fragment: &[Lexeme]) -> Option<ColumnDef> {
        let (first, rest) = fragment.split_first()?;
        let name = first.word(self.source)?;
        if CONSTRAINT_WORDS.iter().any(|w| w.eq_ignore_ascii_case(name)) {
            return None;
        }
        let type_len = rest
            .iter()
            .position(|l| ends_type(&l.token))
            .unwrap_or(rest.len());
        let type_tokens = &rest[..type_len];
        let type_text = match (type_tokens.first(), type_tokens.last()) {
            (Some(a), Some(b)) => &self.source[a.span.start..b.span.end],
            _ => "",
        };
        Some(ColumnDef::new(name, infer_type(type_text)))
    }

    pub fn statement(&self) -> ParsedStatement {
        match self.create_table() {
            Some(def) => ParsedStatement::CreateTableLike {
                table_name: def.name,
                columns: def.columns,
            },
            None => ParsedStatement::Unrecognized,
        }
    }

    /// Every value group following a `VALUES` keyword, in order of appearance.
    pub fn row_tuples(&self) -> Vec<RowTuple> {
        let mut tuples = Vec::new();

        for (start, lexeme) in self.lexemes.iter().enumerate() {
            if lexeme.token != Token::Values {
                continue;
            }
            let mut cursor = self.cursor(start + 1);
            while cursor.eat(&Token::LParen) {
                let tuple = cursor
                    .group_fragments()
                    .into_iter()
                    .map(|fragment| self.cell(fragment))
                    .collect();
                tuples.push(tuple);

                if !(cursor.current() == &Token::Comma && cursor.nth(1) == &Token::LParen) {
                    break;
                }
                cursor.advance();
            }
        }

        tuples
    }

    fn cell(&self, fragment: &[Lexeme]) -> String {
        match fragment {
            [] => String::new(),
            [only] => match &only.token {
                Token::Str(s) => s.clone(),
                _ => strip_quotes(&self.source[only.span.clone()]),
            },
            [first, .., last] => strip_quotes(&self.source[first.span.start..last.span.end]),
        }
    }

    /// True when the draft drops a table.
    pub fn is_destructive(&self) -> bool {
        self.lexemes
            .windows(2)
            .any(|w| w[0].token == Token::Drop && w[1].token == Token::Table)
    }

    /// True when the leading keyword changes data or structure.
    pub fn is_mutating(&self) -> bool {
        match self.lexemes.first().map(|l| &l.token) {
            Some(Token::Insert | Token::Update | Token::Delete | Token::Create | Token::Drop) => {
                true
            }
            Some(Token::Ident(word)) => MUTATING_IDENTS.iter().any(|w| w.eq_ignore_ascii_case(word)),
            _ => false,
        }
    }
}

fn ends_type(token: &Token) -> bool {
    match token {
        Token::Not
        | Token::Constraint
        | Token::Check
        | Token::Primary
        | Token::Unique
        | Token::Str(_) => true,
        Token::Ident(word) => COLUMN_CLAUSE_IDENTS
            .iter()
            .any(|w| w.eq_ignore_ascii_case(word)),
        _ => false,
    }
}

/// Trim a cell and remove one surrounding pair of quotes.
/// An opening quote without its closing partner is still removed.
fn strip_quotes(raw: &str) -> String {
    let trimmed = raw.trim();
    for quote in ['\'', '"'] {
        if let Some(rest) = trimmed.strip_prefix(quote) {
            return rest.strip_suffix(quote).unwrap_or(rest).to_string();
        }
    }
    trimmed.to_string()
}

struct Cursor<'s> {
    lexemes: &'s [Lexeme],
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn current(&self) -> &'s Token {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> &'s Token {
        self.lexemes
            .get(self.pos + n)
            .map(|l| &l.token)
            .unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.lexemes.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_all(&mut self, tokens: &[Token]) -> bool {
        let matched = tokens.iter().enumerate().all(|(i, t)| self.nth(i) == t);
        if matched {
            self.pos += tokens.len();
        }
        matched
    }

    fn skip_if_not_exists(&mut self) {
        self.eat_all(&[Token::If, Token::Not, Token::Exists]);
    }

    fn skip_if_exists(&mut self) {
        self.eat_all(&[Token::If, Token::Exists]);
    }

    /// `name` or `schema.name`; yields the last part.
    fn table_name(&mut self) -> Option<String> {
        let Token::Ident(name) = self.current() else {
            return None;
        };
        self.advance();

        if self.current() == &Token::Dot {
            if let Token::Ident(inner) = self.nth(1) {
                self.pos += 2;
                return Some(inner.clone());
            }
        }
        Some(name.clone())
    }

    /// Split the body of an already opened parenthesis into comma-separated
    /// fragments at its own nesting level. Stops after the matching `)` or at
    /// the end of input when the group is unterminated.
    fn group_fragments(&mut self) -> Vec<&'s [Lexeme]> {
        let lexemes = self.lexemes;
        let mut fragments = Vec::new();
        let mut depth = 0usize;
        let mut start = self.pos;

        loop {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen if depth > 0 => depth -= 1,
                Token::Comma if depth == 0 => {
                    fragments.push(&lexemes[start..self.pos]);
                    start = self.pos + 1;
                }
                Token::RParen => {
                    fragments.push(&lexemes[start..self.pos]);
                    self.advance();
                    return fragments;
                }
                Token::Eof => {
                    let end = self.pos.min(lexemes.len());
                    fragments.push(&lexemes[start.min(end)..end]);
                    return fragments;
                }
                _ => {}
            }
            self.advance();
        }
    }
}

/// Table name the draft operates on, if any shape names one.
pub fn detect_table(draft: &str) -> Option<String> {
    Scan::new(draft).table_reference()
}

/// Parse a `CREATE TABLE` shape into its ordered columns.
pub fn parse_create_table(draft: &str) -> Option<TableDef> {
    Scan::new(draft).create_table()
}

pub fn parse_statement(draft: &str) -> ParsedStatement {
    Scan::new(draft).statement()
}

/// In-progress value tuples of insert-style text.
pub fn extract_rows(draft: &str) -> Vec<RowTuple> {
    Scan::new(draft).row_tuples()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ColumnType;

    fn names(def: &TableDef) -> Vec<&str> {
        def.columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_detect_insert_into() {
        assert_eq!(
            detect_table("INSERT INTO students VALUES (1)"),
            Some("students".into())
        );
    }

    #[test]
    fn test_detect_priority_beats_position() {
        // FROM appears first, but INSERT INTO has higher priority.
        let sql = "SELECT * FROM courses; insert into students values (1)";
        assert_eq!(detect_table(sql), Some("students".into()));
    }

    #[test]
    fn test_detect_each_shape() {
        assert_eq!(detect_table("select name from Students"), Some("Students".into()));
        assert_eq!(detect_table("UPDATE courses SET x = 1"), Some("courses".into()));
        assert_eq!(detect_table("DROP TABLE pets"), Some("pets".into()));
        assert_eq!(
            detect_table("CREATE TABLE IF NOT EXISTS pets (id INT)"),
            Some("pets".into())
        );
        assert_eq!(detect_table("delete from main.pets"), Some("pets".into()));
    }

    #[test]
    fn test_detect_drop_if_exists() {
        assert_eq!(
            detect_table("DROP TABLE IF EXISTS students"),
            Some("students".into())
        );
        assert_eq!(
            detect_table("drop table if exists main.pets;"),
            Some("pets".into())
        );
    }

    #[test]
    fn test_detect_no_match() {
        assert_eq!(detect_table(""), None);
        assert_eq!(detect_table("SELECT 1"), None);
        assert_eq!(detect_table("INSERT INTO"), None);
        assert_eq!(detect_table("SELECT * FROM WHERE"), None);
    }

    #[test]
    fn test_detect_is_idempotent() {
        for sql in ["", "UPDATE t SET a = 1", "SELECT * FROM x", "INSERT INTO"] {
            assert_eq!(detect_table(sql), detect_table(sql));
        }
    }

    #[test]
    fn test_create_table_with_parameterized_type() {
        let def = parse_create_table("CREATE TABLE t (a INT, b VARCHAR(10))").unwrap();
        assert_eq!(def.name, "t");
        assert_eq!(
            def.columns,
            vec![
                ColumnDef::new("a", ColumnType::Number),
                ColumnDef::new("b", ColumnType::Text),
            ]
        );
    }

    #[test]
    fn test_create_table_nested_comma_and_newlines() {
        let sql = "create\n  table\tprices\n(\n  id serial,\n  amount NUMERIC(8, 2) NOT NULL,\n  note text\n);";
        let def = parse_create_table(sql).unwrap();
        assert_eq!(names(&def), vec!["id", "amount", "note"]);
        assert_eq!(def.columns[1].typ, ColumnType::Number);
    }

    #[test]
    fn test_create_table_if_not_exists() {
        let def = parse_create_table("CREATE TABLE IF NOT EXISTS pets (name TEXT)").unwrap();
        assert_eq!(def.name, "pets");
        assert_eq!(names(&def), vec!["name"]);
    }

    #[test]
    fn test_create_table_constraints_filtered() {
        let orderings = [
            "CREATE TABLE t (PRIMARY KEY (a), a INT, b TEXT)",
            "CREATE TABLE t (a INT, primary key (a), b TEXT)",
            "CREATE TABLE t (a INT, b TEXT, FOREIGN KEY (b) REFERENCES u(id))",
            "CREATE TABLE t (constraint pk PRIMARY KEY (a), a INT, Key idx (b), b TEXT)",
            "CREATE TABLE t (a INT, UNIQUE (a, b), b TEXT, CHECK (a > 0))",
        ];
        for sql in orderings {
            let def = parse_create_table(sql).unwrap();
            assert_eq!(names(&def), vec!["a", "b"], "{sql}");
        }
    }

    #[test]
    fn test_create_table_truncated_body() {
        let def = parse_create_table("CREATE TABLE t (id INT, name VARCH").unwrap();
        assert_eq!(names(&def), vec!["id", "name"]);
        assert_eq!(def.columns[1].typ, ColumnType::Text);

        let def = parse_create_table("CREATE TABLE t (id INT,").unwrap();
        assert_eq!(names(&def), vec!["id"]);

        let def = parse_create_table("CREATE TABLE t (").unwrap();
        assert!(def.columns.is_empty());
    }

    #[test]
    fn test_create_table_no_match() {
        assert_eq!(parse_create_table(""), None);
        assert_eq!(parse_create_table("CREATE TABLE t"), None);
        assert_eq!(parse_create_table("SELECT * FROM t"), None);
        assert_eq!(parse_statement("SELECT 1"), ParsedStatement::Unrecognized);
    }

    #[test]
    fn test_type_scan_ignores_column_name() {
        let def = parse_create_table("CREATE TABLE t (points TEXT, label INT)").unwrap();
        assert_eq!(def.columns[0].typ, ColumnType::Text);
        assert_eq!(def.columns[1].typ, ColumnType::Number);
    }

    #[test]
    fn test_type_scan_stops_at_column_clauses() {
        let sql = "CREATE TABLE t (\
            title TEXT DEFAULT 'print',\
            n TEXT CONSTRAINT nn NOT NULL,\
            status ENUM('a', 'b'),\
            label VARCHAR(20) CHECK (label <> 'int'),\
            owner TEXT REFERENCES users(id),\
            amount DECIMAL(8, 2) NOT NULL DEFAULT 0)";
        let def = parse_create_table(sql).unwrap();
        let types: Vec<ColumnType> = def.columns.iter().map(|c| c.typ).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Text,
                ColumnType::Number,
            ]
        );
    }

    #[test]
    fn test_statement_create_table_like() {
        assert_eq!(
            parse_statement("CREATE TABLE t (a INT)"),
            ParsedStatement::CreateTableLike {
                table_name: "t".into(),
                columns: vec![ColumnDef::new("a", ColumnType::Number)],
            }
        );
    }

    #[test]
    fn test_extract_single_tuple() {
        assert_eq!(
            extract_rows("INSERT INTO t VALUES ('x', 1)"),
            vec![vec!["x".to_string(), "1".to_string()]]
        );
    }

    #[test]
    fn test_extract_quoted_comma_not_split() {
        assert_eq!(
            extract_rows(r#"INSERT INTO t VALUES ('a, b', "c", 'it''s')"#),
            vec![vec!["a, b".to_string(), "c".to_string(), "it's".to_string()]]
        );
    }

    #[test]
    fn test_extract_multiple_groups_in_order() {
        let sql = "INSERT INTO t VALUES (1, 'a'), (2, 'b');\nINSERT INTO t VALUES (3, 'c')";
        let rows = extract_rows(sql);
        let firsts: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(firsts, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_extract_unterminated_group() {
        assert_eq!(
            extract_rows("INSERT INTO t VALUES (7, 'Ali"),
            vec![vec!["7".to_string(), "Ali".to_string()]]
        );
        assert_eq!(
            extract_rows("INSERT INTO t VALUES (7, "),
            vec![vec!["7".to_string(), String::new()]]
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_rows("").is_empty());
        assert!(extract_rows("INSERT INTO t VALUES").is_empty());
        assert!(extract_rows("SELECT * FROM t").is_empty());
    }

    #[test]
    fn test_extract_expression_cell() {
        assert_eq!(
            extract_rows("VALUES (1 + 2, lower('X'))"),
            vec![vec!["1 + 2".to_string(), "lower('X')".to_string()]]
        );
    }

    #[test]
    fn test_destructive_and_mutating() {
        assert!(Scan::new("DROP TABLE students").is_destructive());
        assert!(!Scan::new("DELETE FROM students").is_destructive());

        assert!(Scan::new("insert into t values (1)").is_mutating());
        assert!(Scan::new("ALTER TABLE t ADD x INT").is_mutating());
        assert!(!Scan::new("SELECT * FROM t").is_mutating());
        assert!(!Scan::new("").is_mutating());
    }
}
