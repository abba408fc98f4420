//! Boolean queries over an [`InvertedIndex`].
//!
//! # Grammar
//!
//! ```text
//! or_expr  := and_expr (OR and_expr)*
//! and_expr := not_expr (AND? not_expr)*
//! not_expr := NOT not_expr | primary
//! primary  := TERM | '(' or_expr ')'
//! ```
//!
//! `AND`, `OR` and `NOT` are operators only when written in upper case.
//! Adjacent terms without an operator are ANDed.

use crate::algebra::{difference, intersect, union_many};
use crate::error::QueryError;
use crate::index::{DocId, InvertedIndex};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Term(String),
    And(Vec<Query>),
    Or(Vec<Query>),
    Not(Box<Query>),
}

impl Query {
    pub fn term(t: impl Into<String>) -> Self { Query::Term(t.into()) }

    /// Conjunction of plain terms.
    pub fn all_of<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::And(terms.into_iter().map(|t| Query::Term(t.into())).collect())
    }

    pub fn negate(self) -> Self { Query::Not(Box::new(self)) }

    /// Evaluate to an ascending list of matching ids.
    pub fn evaluate(&self, index: &InvertedIndex) -> Vec<DocId> {
        match self {
            Query::Term(t) => index.postings(t).to_vec(),
            Query::Or(children) => {
                let parts: Vec<Vec<DocId>> = children.iter().map(|c| c.evaluate(index)).collect();
                union_many(&parts)
            }
            // complement over the ids actually indexed, which need not be 1..=num_docs
            Query::Not(inner) => difference(&index.doc_ids().collect::<Vec<_>>(), &inner.evaluate(index)),
            Query::And(children) => evaluate_and(children, index),
        }
    }
}

/// Positive clauses are intersected smallest first with short-circuit,
/// negated clauses are subtracted afterwards.
fn evaluate_and(children: &[Query], index: &InvertedIndex) -> Vec<DocId> {
    let (negated, positive): (Vec<&Query>, Vec<&Query>) =
        children.iter().partition(|c| matches!(c, Query::Not(_)));

    let mut result = if positive.is_empty() {
        index.doc_ids().collect()
    } else {
        // sizes are only known once clauses are evaluated, plain terms are cheap
        let mut parts: Vec<Vec<DocId>> = Vec::with_capacity(positive.len());
        for clause in positive {
            let ids = clause.evaluate(index);
            if ids.is_empty() {
                tracing::debug!("and clause empty, short-circuit");
                return Vec::new();
            }
            parts.push(ids);
        }
        parts.sort_by_key(Vec::len);
        let mut iter = parts.into_iter();
        let mut acc = iter.next().unwrap_or_default();
        for part in iter {
            acc = intersect(&acc, &part);
            if acc.is_empty() {
                return acc;
            }
        }
        acc
    };

    for clause in negated {
        if result.is_empty() {
            break;
        }
        if let Query::Not(inner) = clause {
            result = difference(&result, &inner.evaluate(index));
        }
    }
    result
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, parts: &[Query], op: &str) -> fmt::Result {
            write!(f, "(")?;
            for (i, q) in parts.iter().enumerate() {
                if i > 0 {
                    write!(f, " {op} ")?;
                }
                write!(f, "{q}")?;
            }
            write!(f, ")")
        }
        match self {
            Query::Term(t) => write!(f, "{t}"),
            Query::And(parts) => join(f, parts, "AND"),
            Query::Or(parts) => join(f, parts, "OR"),
            Query::Not(inner) => write!(f, "NOT {inner}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Term(String),
    And,
    Or,
    Not,
    LeftParen,
    RightParen,
}

impl Token {
    fn text(&self) -> String {
        match self {
            Token::Term(t) => t.clone(),
            Token::And => "AND".into(),
            Token::Or => "OR".into(),
            Token::Not => "NOT".into(),
            Token::LeftParen => "(".into(),
            Token::RightParen => ")".into(),
        }
    }
}

fn lex(input: &str) -> Vec<(usize, Token)> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let flush = |tokens: &mut Vec<(usize, Token)>, start: &mut Option<usize>, end: usize| {
        if let Some(s) = start.take() {
            let word = &input[s..end];
            let tok = match word {
                "AND" => Token::And,
                "OR" => Token::Or,
                "NOT" => Token::Not,
                _ => Token::Term(word.to_string()),
            };
            tokens.push((s, tok));
        }
    };
    for (i, c) in input.char_indices() {
        match c {
            '(' | ')' => {
                flush(&mut tokens, &mut start, i);
                let tok = if c == '(' { Token::LeftParen } else { Token::RightParen };
                tokens.push((i, tok));
            }
            c if c.is_whitespace() => flush(&mut tokens, &mut start, i),
            _ => {
                if start.is_none() {
                    start = Some(i);
                }
            }
        }
    }
    flush(&mut tokens, &mut start, input.len());
    tokens
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn unexpected(&self) -> QueryError {
        match self.tokens.get(self.pos) {
            Some((position, token)) => QueryError::UnexpectedToken { token: token.text(), position: *position },
            None => QueryError::UnexpectedEnd { expected: "term" },
        }
    }

    fn parse_or(&mut self) -> Result<Query, QueryError> {
        let mut clauses = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            clauses.push(self.parse_and()?);
        }
        Ok(collapse(clauses, Query::Or))
    }

    fn parse_and(&mut self) -> Result<Query, QueryError> {
        let mut clauses = vec![self.parse_not()?];
        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.advance();
                    clauses.push(self.parse_not()?);
                }
                Some(Token::Term(_)) | Some(Token::Not) | Some(Token::LeftParen) => {
                    clauses.push(self.parse_not()?);
                }
                _ => break,
            }
        }
        Ok(collapse(clauses, Query::And))
    }

    fn parse_not(&mut self) -> Result<Query, QueryError> {
        if self.peek() == Some(&Token::Not) {
            self.advance();
            return Ok(self.parse_not()?.negate());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Query, QueryError> {
        match self.peek().cloned() {
            Some(Token::Term(t)) => {
                self.advance();
                Ok(Query::Term(t))
            }
            Some(Token::LeftParen) => {
                self.advance();
                let inner = self.parse_or()?;
                match self.peek() {
                    Some(Token::RightParen) => {
                        self.advance();
                        Ok(inner)
                    }
                    Some(_) => Err(self.unexpected()),
                    None => Err(QueryError::UnexpectedEnd { expected: "')'" }),
                }
            }
            _ => Err(self.unexpected()),
        }
    }
}

fn collapse(mut clauses: Vec<Query>, wrap: fn(Vec<Query>) -> Query) -> Query {
    if clauses.len() == 1 {
        clauses.remove(0)
    } else {
        wrap(clauses)
    }
}

/// Parse a boolean query string such as `brutus AND (caesar OR calpurnia) AND NOT noble`.
pub fn parse_query(input: &str) -> Result<Query, QueryError> {
    let tokens = lex(input);
    if tokens.is_empty() {
        return Err(QueryError::Empty);
    }
    let mut parser = Parser { tokens, pos: 0 };
    let query = parser.parse_or()?;
    if parser.pos < parser.tokens.len() {
        return Err(parser.unexpected());
    }
    Ok(query)
}
