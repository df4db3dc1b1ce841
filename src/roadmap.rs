//! Free-text question to statement-building checklist.
//!
//! A question is classified once into an [`IntentCategory`]; each step of the
//! resulting [`Roadmap`] carries a [`DraftCheck`] that is evaluated against the
//! current draft on every edit.

use crate::lexer::{Lexeme, Token};
use crate::parser::Scan;

const AGGREGATE_TERMS: &[&str] = &["minimum", "maximum", "max", "min", "avg", "average", "count", "sum"];
const ALIAS_TERMS: &[&str] = &["rename", "as", "title"];
const DELETE_TERMS: &[&str] = &["delete", "remove", "clear"];
const SELECT_TERMS: &[&str] = &["list", "show", "find", "select", "who"];
const FILTER_TERMS: &[&str] = &["where", "scoring", "more than", "greater", "less", "whose"];
const CREATE_TERMS: &[&str] = &["create", "new table", "make table"];

const AGGREGATE_FUNCTIONS: &[&str] = &["MAX", "MIN", "AVG", "COUNT", "SUM"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentCategory {
    Aggregate,
    Delete,
    SelectFilter,
    CreateTable,
}

/// A completion predicate over the draft text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftCheck {
    AggregateCall,
    FromClause,
    AsAlias,
    DeleteFrom,
    WhereClause,
    SelectKeyword,
    CreateTable,
    IfNotExists,
    ParenGroup,
}

impl DraftCheck {
    pub fn holds(self, draft: &str) -> bool {
        self.holds_in(Scan::new(draft).lexemes())
    }

    fn holds_in(self, lexemes: &[Lexeme]) -> bool {
        let has = |token: Token| lexemes.iter().any(|l| l.token == token);
        let has_seq = |seq: &[Token]| {
            lexemes
                .windows(seq.len())
                .any(|w| w.iter().zip(seq).all(|(l, t)| &l.token == t))
        };

        match self {
            Self::AggregateCall => lexemes.iter().any(|l| {
                matches!(&l.token, Token::Ident(name)
                    if AGGREGATE_FUNCTIONS.iter().any(|f| f.eq_ignore_ascii_case(name)))
            }),
            Self::FromClause => has(Token::From),
            Self::AsAlias => has(Token::As),
            Self::DeleteFrom => has_seq(&[Token::Delete, Token::From]),
            Self::WhereClause => has(Token::Where),
            Self::SelectKeyword => has(Token::Select),
            Self::CreateTable => has_seq(&[Token::Create, Token::Table]),
            Self::IfNotExists => has_seq(&[Token::If, Token::Not, Token::Exists]),
            Self::ParenGroup => lexemes
                .iter()
                .position(|l| l.token == Token::LParen)
                .is_some_and(|open| lexemes[open..].iter().any(|l| l.token == Token::RParen)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoadmapStep {
    pub id: &'static str,
    pub description: &'static str,
    pub check: DraftCheck,
}

impl RoadmapStep {
    const fn new(id: &'static str, description: &'static str, check: DraftCheck) -> Self {
        Self {
            id,
            description,
            check,
        }
    }

    pub fn is_complete(&self, draft: &str) -> bool {
        self.check.holds(draft)
    }
}

const AGGREGATE_STEPS: &[RoadmapStep] = &[
    RoadmapStep::new(
        "aggregate",
        "Use an aggregate function (MAX, MIN, AVG, COUNT or SUM)",
        DraftCheck::AggregateCall,
    ),
    RoadmapStep::new("source", "Specify the source table with FROM", DraftCheck::FromClause),
];
const ALIAS_STEP: RoadmapStep =
    RoadmapStep::new("alias", "Rename the result column with AS", DraftCheck::AsAlias);

const DELETE_STEPS: &[RoadmapStep] = &[
    RoadmapStep::new("delete", "Start with DELETE FROM <table>", DraftCheck::DeleteFrom),
    RoadmapStep::new("filter", "Filter rows with a WHERE condition", DraftCheck::WhereClause),
];

const SELECT_STEPS: &[RoadmapStep] = &[
    RoadmapStep::new("columns", "Choose the columns with SELECT", DraftCheck::SelectKeyword),
    RoadmapStep::new("source", "Identify the source table with FROM", DraftCheck::FromClause),
];
const FILTER_STEP: RoadmapStep =
    RoadmapStep::new("filter", "Filter rows with a WHERE condition", DraftCheck::WhereClause);

const CREATE_STEPS: &[RoadmapStep] = &[
    RoadmapStep::new("create", "Use CREATE TABLE <name>", DraftCheck::CreateTable),
    RoadmapStep::new("if-not-exists", "Recommended: add IF NOT EXISTS", DraftCheck::IfNotExists),
    RoadmapStep::new("columns", "Define the columns inside parentheses", DraftCheck::ParenGroup),
];

/// Lowercased words of a question.
struct Question {
    words: Vec<String>,
}

impl Question {
    fn new(text: &str) -> Self {
        let words = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { words }
    }

    /// True when any term occurs as a word or word sequence, allowing
    /// inflected forms of longer words.
    fn mentions(&self, terms: &[&str]) -> bool {
        terms.iter().any(|term| {
            let parts: Vec<&str> = term.split(' ').collect();
            self.words
                .windows(parts.len())
                .any(|w| w.iter().zip(&parts).all(|(word, part)| inflects(word, part)))
        })
    }
}

/// `word` is `term` or `term` with a plural or verb ending. Short terms
/// (`as`, `max`, `who`) only match exactly.
fn inflects(word: &str, term: &str) -> bool {
    const ENDINGS: &[&str] = &["s", "es", "ed", "ing"];

    if word == term {
        return true;
    }
    if term.len() < 4 {
        return false;
    }
    let stem = term.strip_suffix('e').unwrap_or(term);
    word.strip_prefix(stem)
        .is_some_and(|ending| ENDINGS.contains(&ending))
}

/// Ordered checklist for one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Roadmap {
    pub category: Option<IntentCategory>,
    pub steps: Vec<RoadmapStep>,
}

impl Roadmap {
    /// Build the roadmap for a free-text question.
    ///
    /// Aggregate, Delete and SelectFilter are tried in that order and the
    /// first match is kept. A create-table question then replaces whatever
    /// was chosen, even if an earlier category matched.
    pub fn for_question(text: &str) -> Self {
        let question = Question::new(text);

        let mut roadmap = if question.mentions(AGGREGATE_TERMS) {
            let mut steps = AGGREGATE_STEPS.to_vec();
            if question.mentions(ALIAS_TERMS) {
                steps.push(ALIAS_STEP);
            }
            Self::with(IntentCategory::Aggregate, steps)
        } else if question.mentions(DELETE_TERMS) {
            Self::with(IntentCategory::Delete, DELETE_STEPS.to_vec())
        } else if question.mentions(SELECT_TERMS) {
            let mut steps = SELECT_STEPS.to_vec();
            if question.mentions(FILTER_TERMS) {
                steps.push(FILTER_STEP);
            }
            Self::with(IntentCategory::SelectFilter, steps)
        } else {
            Self::default()
        };

        if question.mentions(CREATE_TERMS) {
            roadmap = Self::with(IntentCategory::CreateTable, CREATE_STEPS.to_vec());
        }

        roadmap
    }

    fn with(category: IntentCategory, steps: Vec<RoadmapStep>) -> Self {
        Self {
            category: Some(category),
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Completion of each step against `draft`, in step order.
    pub fn progress(&self, draft: &str) -> Vec<bool> {
        let scan = Scan::new(draft);
        self.steps
            .iter()
            .map(|step| step.check.holds_in(scan.lexemes()))
            .collect()
    }

    pub fn is_finished(&self, draft: &str) -> bool {
        !self.is_empty() && self.progress(draft).into_iter().all(|done| done)
    }
}
