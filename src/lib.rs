//! A tolerant parser for SWIFT MT940 bank statements and a converter into a flat,
//! bank-agnostic list of import transactions.
//!
//! MT940 is a line-oriented, tag-delimited text format with plenty of bank-specific
//! dialects. The parser recognizes the tags it knows, silently skips the ones it doesn't,
//! and treats every untagged line as a continuation of the most recently opened field.
//! Malformed values of recognized tags fail the whole parse: for financial data a wrong
//! transaction count is worse than no result at all.
//!
//! ```
//! use mt940_import::export::convert;
//! use mt940_import::parse_mt940;
//!
//! let statement = "\
//! :20:940S160901
//! :25:531848396
//! :28C:00001/001
//! :60F:C160831EUR1147,95
//! :61:160901D25,03NMSCNONREF
//! :86:BETAALAUTOMAAT 12:04 PAS 013
//! ALBERT HEIJN 1401 AMSTERDAM
//! :62F:C160901EUR1122,92
//! ";
//!
//! let file = parse_mt940(statement).unwrap();
//! assert_eq!(1, file.entries.len());
//! assert_eq!(1, file.entries[0].transactions.len());
//!
//! let bank = convert(&file);
//! assert!(bank.transactions[0].amount.is_sign_negative());
//! ```

#[macro_use]
extern crate log;

#[cfg(test)]
#[macro_use]
extern crate pretty_assertions;

extern crate serde;
#[macro_use]
extern crate serde_derive;

extern crate chrono;
extern crate rust_decimal;

mod errors;
pub mod export;
pub mod tag_parsers;
mod utils;

use std::io::BufRead;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

pub use crate::errors::{AmountParseError, DateParseError, ParseError};
pub use crate::export::{convert, ImportBank, ImportTransaction};

use crate::tag_parsers::{parse_25_tag, parse_28_tag, parse_61_tag, parse_balance_tag};

/// A fully parsed MT940 document: every statement block found in the input, in source
/// order. Nothing is deduplicated.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mt940File {
    pub entries: Vec<Mt940Entry>,
}

/// One statement block, bounded by its opening and closing balance tags.
///
/// Multi-account files carry one block per account, so a file maps to one or more entries.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mt940Entry {
    // Tag :20:
    pub transaction_ref_no: Option<String>,

    // Tag :25:
    // The account identification exactly as the bank emitted it. Some banks pad it with
    // trailing whitespace, so it is stored untrimmed.
    pub kontobezeichnung: String,

    // Tag :28: or :28C:
    pub statement_no: Option<String>,
    pub sequence_no: Option<String>,

    // Tag :60F: or :60M:
    pub opening_balance: Balance,

    // Tag :61: and its :86: description block
    pub transactions: Vec<Mt940Transaction>,

    // Tag :62F: or :62M:
    pub closing_balance: Balance,
}

/// A single transaction from a `:61:` statement line plus its `:86:` description block.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mt940Transaction {
    pub value_date: NaiveDate,
    pub entry_date: Option<NaiveDate>,
    pub ext_debit_credit_indicator: ExtDebitOrCredit,
    pub funds_code: Option<String>,
    /// Unsigned magnitude. The direction lives in the indicator.
    pub amount: Decimal,
    /// Bank transaction type code such as `NMSC`, kept verbatim.
    pub transaction_type_code: String,
    pub customer_ref: Option<String>,
    pub bank_ref: Option<String>,
    pub supplementary_details: Option<String>,
    /// All `:86:` lines belonging to this transaction, newline-joined. Empty if the bank
    /// sent none.
    pub description: String,
}

/// An opening or closing balance from a `:60F:`/`:60M:`/`:62F:`/`:62M:` field.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    /// True for the `M` qualifier: an intermediate balance of a multi-part statement.
    pub is_intermediate: bool,
    pub debit_credit_indicator: DebitOrCredit,
    pub date: NaiveDate,
    pub iso_currency_code: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum DebitOrCredit {
    Debit,
    Credit,
}

impl FromStr for DebitOrCredit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(DebitOrCredit::Credit),
            "D" => Ok(DebitOrCredit::Debit),
            _ => Err(()),
        }
    }
}

/// Extended debit/credit indicator as used in `:61:` statement lines.
///
/// Reversals invert the economic direction: a reversal of a credit (`RC`) takes money back
/// out of the account just like a debit would, a reversal of a debit (`RD`) puts it back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum ExtDebitOrCredit {
    Debit,
    Credit,
    ReverseDebit,
    ReverseCredit,
}

impl FromStr for ExtDebitOrCredit {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" => Ok(ExtDebitOrCredit::Credit),
            "D" => Ok(ExtDebitOrCredit::Debit),
            "RC" => Ok(ExtDebitOrCredit::ReverseDebit),
            "RD" => Ok(ExtDebitOrCredit::ReverseCredit),
            _ => Err(()),
        }
    }
}

/// This is a generic struct that serves as a container for the first pass of the parser.
/// It simply stores every field with absolutely no parsing or validation done on field
/// values.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Field {
    pub tag: String,
    /// Raw field value, continuation lines newline-joined, verbatim.
    pub value: String,
    /// 1-based line number of the tag line in the source input.
    pub line: usize,
}

impl FromStr for Field {
    type Err = ();

    /// Parse a single field from text starting with a tag line; any further lines are
    /// continuations of it. The line number is taken as 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = parse_fields(s);
        if fields.len() == 1 {
            Ok(fields.remove(0))
        } else {
            Err(())
        }
    }
}

/// Split a line into tag and value if it is a tag line.
///
/// A tag line is `:` + 2-4 alphanumeric chars + `:` + rest. Anything else is a
/// continuation of whatever field came before it.
fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(':')?;
    let colon = rest.find(':')?;
    let tag = &rest[..colon];
    if (2..=4).contains(&tag.len()) && tag.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Some((tag, &rest[colon + 1..]))
    } else {
        None
    }
}

fn push_line(fields: &mut Vec<Field>, line_no: usize, line: &str) {
    if let Some((tag, value)) = split_tag_line(line) {
        fields.push(Field {
            tag: tag.to_string(),
            value: value.to_string(),
            line: line_no,
        });
    } else if let Some(open) = fields.last_mut() {
        open.value.push('\n');
        open.value.push_str(line);
    } else {
        // Envelope headers and the like before the first tag line.
        trace!("Line {}: no field open yet, dropping '{}'", line_no, line);
    }
}

/// Split raw statement text into a list of raw `Field`s.
///
/// This performs tag recognition and continuation handling only; field values are not
/// validated. A line that doesn't start a recognized tag continues the most recently
/// opened field and is appended verbatim, newline-joined — that rule is what absorbs most
/// real-world dialect variation and is never an error. Untagged lines before the first tag
/// line are dropped.
pub fn parse_fields(statement: &str) -> Vec<Field> {
    let mut fields = vec![];
    for (idx, line) in statement.lines().enumerate() {
        push_line(&mut fields, idx + 1, line);
    }
    fields
}

/// Parse a whole MT940 document.
///
/// Returns one [`Mt940Entry`] per statement block, in source order. Fails if the input
/// contains no statement at all, if a block is never closed by a `:62F:`/`:62M:` balance,
/// or if a recognized tag carries a malformed value.
pub fn parse_mt940(statement: &str) -> Result<Mt940File, ParseError> {
    Mt940File::from_fields(parse_fields(statement))
}

/// Parse a whole MT940 document from a caller-owned reader, line by line.
///
/// The reader is consumed to completion or to the first failure; its lifecycle (and any
/// cancellation) stays with the caller.
pub fn parse_mt940_reader<R: BufRead>(reader: R) -> Result<Mt940File, ParseError> {
    let mut fields = vec![];
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        push_line(&mut fields, idx + 1, &line);
    }
    Mt940File::from_fields(fields)
}

/// Accumulator for the statement block currently being assembled.
#[derive(Debug, Default)]
struct EntryBuilder {
    start_line: usize,
    transaction_ref_no: Option<String>,
    kontobezeichnung: Option<String>,
    statement_no: Option<String>,
    sequence_no: Option<String>,
    opening_balance: Option<Balance>,
    transactions: Vec<Mt940Transaction>,
    current_transaction: Option<Mt940Transaction>,
}

impl EntryBuilder {
    fn new(start_line: usize) -> EntryBuilder {
        EntryBuilder {
            start_line,
            ..EntryBuilder::default()
        }
    }

    fn flush_transaction(&mut self) {
        if let Some(transaction) = self.current_transaction.take() {
            self.transactions.push(transaction);
        }
    }

    fn finish(mut self, closing_balance: Balance, line: usize) -> Result<Mt940Entry, ParseError> {
        self.flush_transaction();
        let kontobezeichnung = self
            .kontobezeichnung
            .ok_or_else(|| ParseError::RequiredTagNotFound {
                tag: "25".to_string(),
                line,
            })?;
        let opening_balance =
            self.opening_balance
                .ok_or_else(|| ParseError::RequiredTagNotFound {
                    tag: "60".to_string(),
                    line,
                })?;
        Ok(Mt940Entry {
            transaction_ref_no: self.transaction_ref_no,
            kontobezeichnung,
            statement_no: self.statement_no,
            sequence_no: self.sequence_no,
            opening_balance,
            transactions: self.transactions,
            closing_balance,
        })
    }
}

impl Mt940File {
    /// Construct a `Mt940File` from the raw fields of the first pass.
    ///
    /// A lookup-miss in the tag dispatch is not an error; unknown tags are skipped
    /// together with their continuation lines. A recognized tag that fails to parse is.
    fn from_fields(fields: Vec<Field>) -> Result<Mt940File, ParseError> {
        let mut entries = vec![];
        let mut entry: Option<EntryBuilder> = None;

        for field in fields {
            debug!("Line {}: parsing tag ':{}:'", field.line, field.tag);

            match field.tag.as_str() {
                "20" => {
                    if let Some(open) = &entry {
                        return Err(ParseError::UnclosedStatement {
                            line: open.start_line,
                        });
                    }
                    let mut builder = EntryBuilder::new(field.line);
                    builder.transaction_ref_no = Some(field.value.trim().to_string());
                    entry = Some(builder);
                }
                "25" => match &mut entry {
                    Some(open) if open.kontobezeichnung.is_none() => {
                        open.kontobezeichnung = Some(parse_25_tag(&field));
                    }
                    Some(open) => {
                        return Err(ParseError::UnclosedStatement {
                            line: open.start_line,
                        });
                    }
                    None => {
                        let mut builder = EntryBuilder::new(field.line);
                        builder.kontobezeichnung = Some(parse_25_tag(&field));
                        entry = Some(builder);
                    }
                },
                "28" | "28C" => {
                    if let Some(open) = &mut entry {
                        let (statement_no, sequence_no) = parse_28_tag(&field);
                        open.statement_no = statement_no;
                        open.sequence_no = sequence_no;
                    } else {
                        warn!(
                            "Line {}: ':{}:' outside a statement block, skipping",
                            field.line, field.tag
                        );
                    }
                }
                "60F" | "60M" => {
                    if let Some(open) = &mut entry {
                        if open.opening_balance.is_some() {
                            warn!(
                                "Line {}: duplicate opening balance, keeping the newer one",
                                field.line
                            );
                        }
                        open.opening_balance = Some(parse_balance_tag(&field)?);
                    } else {
                        warn!(
                            "Line {}: ':{}:' outside a statement block, skipping",
                            field.line, field.tag
                        );
                    }
                }
                "61" => {
                    if let Some(open) = &mut entry {
                        open.flush_transaction();
                        open.current_transaction = Some(parse_61_tag(&field)?);
                    } else {
                        warn!(
                            "Line {}: ':61:' outside a statement block, skipping",
                            field.line
                        );
                    }
                }
                "86" => {
                    // A description block belongs to the transaction opened by the last
                    // `:61:` until the next `:61:` or balance tag.
                    match entry.as_mut().and_then(|e| e.current_transaction.as_mut()) {
                        Some(transaction) => {
                            if transaction.description.is_empty() {
                                transaction.description = field.value;
                            } else {
                                transaction.description.push('\n');
                                transaction.description.push_str(&field.value);
                            }
                        }
                        None => {
                            // Usually a sign the input was decoded or exported badly.
                            warn!(
                                "Line {}: ':86:' without a preceding ':61:', skipping",
                                field.line
                            );
                        }
                    }
                }
                "62F" | "62M" => {
                    if let Some(open) = entry.take() {
                        let closing_balance = parse_balance_tag(&field)?;
                        entries.push(open.finish(closing_balance, field.line)?);
                    } else {
                        warn!(
                            "Line {}: ':{}:' outside a statement block, skipping",
                            field.line, field.tag
                        );
                    }
                }
                other => {
                    debug!("Line {}: skipping unknown tag ':{}:'", field.line, other);
                }
            }
        }

        if let Some(open) = entry {
            return Err(ParseError::UnclosedStatement {
                line: open.start_line,
            });
        }
        // Reaching this point with nothing collected means no `:20:`/`:25:` ever showed
        // up: anything else either produced an entry or failed above.
        if entries.is_empty() {
            return Err(ParseError::NoStatementFound);
        }

        Ok(Mt940File { entries })
    }
}
