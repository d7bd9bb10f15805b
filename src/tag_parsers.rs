use std::str::FromStr;

use chrono::prelude::*;

use crate::errors::ParseError;
use crate::utils::{date_from_mt940_date, date_from_mt940_short_date, decimal_from_mt940_amount};
use crate::{Balance, DebitOrCredit, ExtDebitOrCredit, Field, Mt940Transaction};

/// Extract the account identification from a `:25:` field.
///
/// The value is kept verbatim. Several banks pad the identification with trailing
/// whitespace and importers want to compare both the padded and the trimmed form, so not
/// even trailing whitespace is stripped here.
pub fn parse_25_tag(field: &Field) -> String {
    field.value.clone()
}

/// Extract statement and sequence number from a `:28:` or `:28C:` field.
///
/// The wire format is `statement_no[/sequence_no]`. Both parts are informational only.
pub fn parse_28_tag(field: &Field) -> (Option<String>, Option<String>) {
    let mut parts = field.value.trim().splitn(2, '/');
    let statement_no = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let sequence_no = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (statement_no, sequence_no)
}

/// Parse a `:60F:`/`:60M:`/`:62F:`/`:62M:` balance field.
///
/// Positional layout: debit/credit indicator (1), date (6, YYMMDD), ISO currency code (3),
/// amount in comma-decimal notation (rest). Only the first physical line carries data;
/// continuation lines under a balance tag (such as the `-` block separators some banks
/// emit after the closing balance) are ignored.
pub fn parse_balance_tag(field: &Field) -> Result<Balance, ParseError> {
    let line = field.line;
    let err = |reason: String| ParseError::InvalidBalance { line, reason };

    let is_intermediate = field.tag.ends_with('M');
    let value = field.value.splitn(2, '\n').next().unwrap_or("").trim_end();

    let indicator = value
        .get(..1)
        .ok_or_else(|| err("field is empty".to_string()))?;
    let debit_credit_indicator = DebitOrCredit::from_str(indicator)
        .map_err(|_| err(format!("bad debit/credit indicator '{}'", indicator)))?;

    let date_str = value
        .get(1..7)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| err("missing 6-digit date".to_string()))?;
    let date = date_from_mt940_date(date_str)
        .map_err(|source| ParseError::InvalidDate { line, source })?;

    let iso_currency_code = value
        .get(7..10)
        .filter(|s| s.bytes().all(|b| b.is_ascii_alphabetic()))
        .ok_or_else(|| err("missing 3-letter currency code".to_string()))?;

    let amount_str = value
        .get(10..)
        .ok_or_else(|| err("missing amount".to_string()))?;
    let amount = decimal_from_mt940_amount(amount_str)
        .map_err(|source| ParseError::InvalidAmount { line, source })?;

    Ok(Balance {
        is_intermediate,
        debit_credit_indicator,
        date,
        iso_currency_code: iso_currency_code.to_string(),
        amount,
    })
}

/// Parse a `:61:` statement line into a transaction.
///
/// Positional layout on the first physical line: value date (6, YYMMDD), optional entry
/// date (4, MMDD), debit/credit indicator (`C`/`D`/`RC`/`RD`), optional funds code letter,
/// amount in comma-decimal notation, transaction type code (up to 4 chars, kept verbatim),
/// then free reference text where `//` separates the customer from the bank reference.
/// Any continuation lines of the field become the supplementary details.
pub fn parse_61_tag(field: &Field) -> Result<Mt940Transaction, ParseError> {
    let line = field.line;
    let err = |reason: String| ParseError::InvalidStatementLine { line, reason };

    let mut parts = field.value.splitn(2, '\n');
    let first = parts.next().unwrap_or("").trim_end();
    let supplementary_details = parts
        .next()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    let value_date_str = first
        .get(..6)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| err("missing 6-digit value date".to_string()))?;
    let value_date = date_from_mt940_date(value_date_str)
        .map_err(|source| ParseError::InvalidDate { line, source })?;
    let mut pos = 6;

    // The entry date is present exactly when another 4 digits follow the value date. A
    // debit/credit indicator can never start with a digit, so the probe is unambiguous.
    let entry_date = match first.get(pos..pos + 4) {
        Some(s) if s.bytes().all(|b| b.is_ascii_digit()) => {
            pos += 4;
            Some(
                date_from_mt940_short_date(s, value_date.year())
                    .map_err(|source| ParseError::InvalidDate { line, source })?,
            )
        }
        _ => None,
    };

    let indicator_len = if first.as_bytes().get(pos) == Some(&b'R') {
        2
    } else {
        1
    };
    let indicator = first
        .get(pos..pos + indicator_len)
        .ok_or_else(|| err("missing debit/credit indicator".to_string()))?;
    let ext_debit_credit_indicator = ExtDebitOrCredit::from_str(indicator)
        .map_err(|_| err(format!("bad debit/credit indicator '{}'", indicator)))?;
    pos += indicator_len;

    let funds_code = match first[pos..].chars().next() {
        Some(c) if c.is_ascii_alphabetic() => {
            pos += 1;
            Some(c.to_string())
        }
        _ => None,
    };

    let rest = &first[pos..];
    let amount_len = rest
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or_else(|| rest.len());
    if amount_len == 0 {
        return Err(err("missing amount".to_string()));
    }
    let amount = decimal_from_mt940_amount(&rest[..amount_len])
        .map_err(|source| ParseError::InvalidAmount { line, source })?;
    pos += amount_len;

    let rest = &first[pos..];
    let code_len = rest
        .chars()
        .take(4)
        .take_while(|c| c.is_ascii_alphanumeric())
        .count();
    if code_len == 0 {
        return Err(err("missing transaction type code".to_string()));
    }
    let transaction_type_code = rest[..code_len].to_string();
    pos += code_len;

    let (customer_ref, bank_ref) = split_reference(first[pos..].trim());

    Ok(Mt940Transaction {
        value_date,
        entry_date,
        ext_debit_credit_indicator,
        funds_code,
        amount,
        transaction_type_code,
        customer_ref,
        bank_ref,
        supplementary_details,
        description: String::new(),
    })
}

/// Split `:61:` reference text into customer and bank reference at the first `//`.
fn split_reference(reference: &str) -> (Option<String>, Option<String>) {
    let mut parts = reference.splitn(2, "//");
    let customer_ref = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    let bank_ref = parts
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (customer_ref, bank_ref)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use regex::Regex;
    use rstest::rstest_parametrize;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    use super::*;

    #[rstest_parametrize(
        input,
        expected_decimal,
        case(":60F:C100318EUR380115,12", "380115.12"),
        case(":60F:C100318EUR380115,1", "380115.1"),
        case(":60F:C100318EUR380115,", "380115"),
        case(":60F:C100318EUR0,12", "0.12"),
        case(":60F:C100318EUR00,12", "0.12"),
        case(":60F:C100318EUR001,12", "1.12")
    )]
    fn balance_amounts(input: &str, expected_decimal: &str) {
        let expected = Balance {
            is_intermediate: false,
            debit_credit_indicator: DebitOrCredit::Credit,
            date: NaiveDate::from_ymd(2010, 3, 18),
            iso_currency_code: "EUR".into(),
            amount: Decimal::from_str(expected_decimal).unwrap(),
        };
        let field = Field::from_str(input).unwrap();
        let parsed = parse_balance_tag(&field).unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn balance_intermediate_qualifier() {
        let field = Field::from_str(":62M:D160915EUR1234,56").unwrap();
        let parsed = parse_balance_tag(&field).unwrap();
        assert!(parsed.is_intermediate);
        assert_eq!(parsed.debit_credit_indicator, DebitOrCredit::Debit);
    }

    #[test]
    fn balance_bad_indicator_fails() {
        let field = Field::from_str(":60F:X100318EUR380115,12").unwrap();
        let parsed = parse_balance_tag(&field);
        assert!(matches!(parsed, Err(ParseError::InvalidBalance { .. })));
    }

    proptest! {
        #[test]
        fn balance_input(intermediate in r"[MF]",
                         debit_credit_indicator in r"[DC]",
                         date in r"[[:digit:]]{2}[01][0-9][0-3][[:digit:]]",
                         iso_currency_code in r"[A-Z]{3}",
                         amount_before_decimal in r"[[:digit:]]{1,12}",
                         amount_after_decimal in r"[[:digit:]]{0,2}") {
            prop_assume!(NaiveDate::parse_from_str(&date, "%y%m%d").is_ok(), "We need a valid date");

            let amount = format!("{},{}", amount_before_decimal, amount_after_decimal);
            let input = format!(
                ":60{}:{}{}{}{}",
                intermediate, debit_credit_indicator, date, iso_currency_code, amount);

            let field = Field::from_str(&input).unwrap();
            let parsed = parse_balance_tag(&field).unwrap();
            let expected = Balance {
                is_intermediate: intermediate == "M",
                debit_credit_indicator: DebitOrCredit::from_str(&debit_credit_indicator).unwrap(),
                date: date_from_mt940_date(&date).unwrap(),
                iso_currency_code,
                amount: decimal_from_mt940_amount(&amount).unwrap(),
            };
            prop_assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn tag_61_full_line() {
        let field = Field::from_str(":61:0910201020DK5312,50NMSCDBT.teste kunden").unwrap();
        let parsed = parse_61_tag(&field).unwrap();
        let expected = Mt940Transaction {
            value_date: NaiveDate::from_ymd(2009, 10, 20),
            entry_date: Some(NaiveDate::from_ymd(2009, 10, 20)),
            ext_debit_credit_indicator: ExtDebitOrCredit::Debit,
            funds_code: Some("K".to_string()),
            amount: Decimal::new(531250, 2),
            transaction_type_code: "NMSC".to_string(),
            customer_ref: Some("DBT.teste kunden".to_string()),
            bank_ref: None,
            supplementary_details: None,
            description: String::new(),
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn tag_61_empty_entry_date() {
        let field = Field::from_str(":61:110701CN50,00NDISNONREF").unwrap();
        let parsed = parse_61_tag(&field).unwrap();
        assert_eq!(parsed.entry_date, None);
        assert_eq!(parsed.funds_code, Some("N".to_string()));
        assert_eq!(parsed.transaction_type_code, "NDIS");
        assert_eq!(parsed.customer_ref, Some("NONREF".to_string()));
    }

    #[test]
    fn tag_61_bank_reference() {
        let field =
            Field::from_str(":61:1607280728D16,00NMSC0000000000000854//00000000001177").unwrap();
        let parsed = parse_61_tag(&field).unwrap();
        assert_eq!(parsed.customer_ref, Some("0000000000000854".to_string()));
        assert_eq!(parsed.bank_ref, Some("00000000001177".to_string()));
    }

    #[test]
    fn tag_61_reversal_indicators() {
        let cases = [
            ("C", ExtDebitOrCredit::Credit),
            ("D", ExtDebitOrCredit::Debit),
            ("RC", ExtDebitOrCredit::ReverseDebit),
            ("RD", ExtDebitOrCredit::ReverseCredit),
        ];
        for (indicator, expected) in &cases {
            let field =
                Field::from_str(&format!(":61:160901{}500,00NMSCNONREF", indicator)).unwrap();
            let parsed = parse_61_tag(&field).unwrap();
            assert_eq!(parsed.ext_debit_credit_indicator, *expected);
        }
    }

    #[test]
    fn tag_61_supplementary_details() {
        let field = Field::from_str(":61:160901D25,03N093NONREF\nEXTRA INFORMATION").unwrap();
        let parsed = parse_61_tag(&field).unwrap();
        assert_eq!(
            parsed.supplementary_details,
            Some("EXTRA INFORMATION".to_string())
        );
    }

    #[test]
    fn tag_61_dotted_amount_fails() {
        let field = Field::from_str(":61:160901D25.03NMSCNONREF").unwrap();
        let parsed = parse_61_tag(&field);
        assert!(matches!(parsed, Err(ParseError::InvalidAmount { .. })));
    }

    #[test]
    fn tag_61_missing_type_code_fails() {
        let field = Field::from_str(":61:160901D25,03").unwrap();
        let parsed = parse_61_tag(&field);
        assert!(matches!(
            parsed,
            Err(ParseError::InvalidStatementLine { .. })
        ));
    }

    proptest! {
        #[test]
        fn tag_61_input(date in (r"[[:digit:]]{2}[01][0-9][0-3][[:digit:]]").prop_filter("We need a valid date", |d| NaiveDate::parse_from_str(&d, "%y%m%d").is_ok()),
                        has_short_date in proptest::bool::weighted(0.5),
                        ext_debit_credit_indicator in r"R?[DC]",
                        funds_code in r"[A-Z]?",
                        amount_before_decimal in r"[[:digit:]]{1,12}",
                        amount_after_decimal in r"[[:digit:]]{0,2}",
                        transaction_type_ident_code in r"[NF][A-Z]{3}",
                        customer_ref in r"[0-9A-Za-z\-\?\(\)\., ]{1,16}",
                        bank_ref in r"[0-9A-Za-z\-\?\(\)\., ]{0,16}") {
            let re_no_ws_in_front_or_end = Regex::new(r"^[^\s]+(\s+[^\s]+)*$").unwrap();
            prop_assume!(re_no_ws_in_front_or_end.is_match(&customer_ref), "Can't have a value that has whitespace in front or end");
            prop_assume!(bank_ref.is_empty() || re_no_ws_in_front_or_end.is_match(&bank_ref), "Can't have a value that has whitespace in front or end");

            let short_date = if has_short_date { &date[2..6] } else { "" };
            let amount = format!("{},{}", amount_before_decimal, amount_after_decimal);
            let customer_bank_ref = if bank_ref.is_empty() {
                customer_ref.clone()
            } else {
                format!("{}//{}", customer_ref, bank_ref)
            };

            let input = format!(
                ":61:{}{}{}{}{}{}{}",
                date, short_date, ext_debit_credit_indicator, funds_code,
                amount, transaction_type_ident_code, customer_bank_ref);
            let field = Field::from_str(&input).unwrap();
            let parsed = parse_61_tag(&field).unwrap();
            let expected = Mt940Transaction {
                value_date: date_from_mt940_date(&date).unwrap(),
                entry_date: if has_short_date { Some(date_from_mt940_date(&date).unwrap()) } else { None },
                ext_debit_credit_indicator: ExtDebitOrCredit::from_str(&ext_debit_credit_indicator).unwrap(),
                funds_code: if funds_code.is_empty() { None } else { Some(funds_code) },
                amount: decimal_from_mt940_amount(&amount).unwrap(),
                transaction_type_code: transaction_type_ident_code,
                customer_ref: Some(customer_ref),
                bank_ref: if bank_ref.is_empty() { None } else { Some(bank_ref) },
                supplementary_details: None,
                description: String::new(),
            };
            prop_assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn tag_28_split() {
        let field = |value: &str| Field {
            tag: "28C".to_string(),
            value: value.to_string(),
            line: 1,
        };
        let parsed = parse_28_tag(&field("00014/001"));
        assert_eq!(parsed.0.as_deref(), Some("00014"));
        assert_eq!(parsed.1.as_deref(), Some("001"));

        let parsed = parse_28_tag(&field("35501"));
        assert_eq!(parsed.0.as_deref(), Some("35501"));
        assert_eq!(parsed.1.as_deref(), None);

        let parsed = parse_28_tag(&field(""));
        assert_eq!(parsed, (None, None));
    }

    #[test]
    fn tag_25_keeps_padding() {
        let field = Field::from_str(":25:3xxxxxx.013EUR   ").unwrap();
        assert_eq!(parse_25_tag(&field), "3xxxxxx.013EUR   ");
    }
}
