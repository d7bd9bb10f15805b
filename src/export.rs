//! Conversion of a parsed [`Mt940File`] into the generic bank import model.
//!
//! The importing side of an accounting engine wants a flat, ordered batch of signed
//! transactions keyed by account; matching, deduplication and reconciliation happen over
//! there. The conversion is pure and lossless with respect to transaction count: exactly
//! one [`ImportTransaction`] comes out per parsed transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{ExtDebitOrCredit, Mt940File, Mt940Transaction};

/// A flat, ordered batch of transactions ready for the importing engine.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImportBank {
    pub transactions: Vec<ImportTransaction>,
}

/// A single bank-agnostic transaction record.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImportTransaction {
    /// Posting date, taken from the statement line's value date.
    pub date: NaiveDate,
    /// Signed amount; debit-direction transactions are negative.
    pub amount: Decimal,
    /// Payee/memo text: the transaction's description, verbatim.
    pub memo: String,
    /// Grouping key: the owning statement's account identification, untrimmed.
    pub account: String,
}

/// Convert a parsed MT940 file into an [`ImportBank`].
///
/// Flattens every entry's transactions in file order. Nothing is reordered, merged or
/// dropped; an input without transactions yields an empty bank.
pub fn convert(file: &Mt940File) -> ImportBank {
    let mut transactions = vec![];
    for entry in &file.entries {
        for transaction in &entry.transactions {
            transactions.push(ImportTransaction {
                date: transaction.value_date,
                amount: signed_amount(transaction),
                memo: transaction.description.clone(),
                account: entry.kontobezeichnung.clone(),
            });
        }
    }
    ImportBank { transactions }
}

/// Apply the debit/credit indicator to the unsigned wire amount.
///
/// A reversal of a credit takes money back out of the account and so counts as a debit;
/// a reversal of a debit puts it back in.
fn signed_amount(transaction: &Mt940Transaction) -> Decimal {
    match transaction.ext_debit_credit_indicator {
        ExtDebitOrCredit::Debit | ExtDebitOrCredit::ReverseDebit => -transaction.amount,
        ExtDebitOrCredit::Credit | ExtDebitOrCredit::ReverseCredit => transaction.amount,
    }
}
