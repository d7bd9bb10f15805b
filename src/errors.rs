use std::io;

use thiserror::Error;

/// Error thrown when parsing of a MT940 date fails.
///
/// MT940 dates are 6-digit `YYMMDD` strings; the two-digit year is expanded
/// to `20YY` before range checking.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum DateParseError {
    #[error("Date is not a 6-digit YYMMDD value: '{0}'")]
    Malformed(String),

    #[error("Date parsing failed for date: '{year}-{month}-{day}'")]
    OutOfRange {
        year: String,
        month: String,
        day: String,
    },
}

/// Error thrown when parsing of a MT940 amount fails.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum AmountParseError {
    #[error("Too many commas in amount: '{0}'")]
    TooManyCommas(String),

    #[error("No comma found in amount: '{0}'")]
    NoComma(String),

    #[error("Couldn't parse as integer: '{0}'")]
    IntParseError(std::num::ParseIntError),
}

/// Error thrown when parsing fails.
///
/// Variants that concern a source line carry the 1-based line number of the
/// offending tag line. Unknown tags are never an error; a recognized tag
/// whose value doesn't match its grammar always is.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No statement found: input contains no ':20:' or ':25:' tag")]
    NoStatementFound,

    #[error("Line {line}: statement opened but never closed by a ':62F:'/':62M:' balance")]
    UnclosedStatement { line: usize },

    #[error("Line {line}: required tag ':{tag}:' not found for this statement")]
    RequiredTagNotFound { tag: String, line: usize },

    #[error("Line {line}: {source}")]
    InvalidDate {
        line: usize,
        source: DateParseError,
    },

    #[error("Line {line}: {source}")]
    InvalidAmount {
        line: usize,
        source: AmountParseError,
    },

    #[error("Line {line}: malformed balance field: {reason}")]
    InvalidBalance { line: usize, reason: String },

    #[error("Line {line}: malformed ':61:' statement line: {reason}")]
    InvalidStatementLine { line: usize, reason: String },

    #[error("Input could not be read: {0}")]
    Io(#[from] io::Error),
}
