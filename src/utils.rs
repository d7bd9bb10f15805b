use chrono::prelude::*;
use rust_decimal::Decimal;

use crate::errors::{AmountParseError, DateParseError};

/// Create a `Decimal` from a MT940 amount.
///
/// MT940 amounts always have a comma as a decimal separator.
/// However, they might not always have digits behind the comma.
pub fn decimal_from_mt940_amount(s: &str) -> Result<Decimal, AmountParseError> {
    // Split at decimal separator.
    let split_decimal_str: Vec<&str> = s.split(',').collect();
    if split_decimal_str.len() == 1 {
        return Err(AmountParseError::NoComma(s.to_string()));
    } else if split_decimal_str.len() > 2 {
        return Err(AmountParseError::TooManyCommas(s.to_string()));
    }
    let (int_part, frac_part) = (split_decimal_str[0], split_decimal_str[1]);
    let whole_number: i64 = format!("{}{}", int_part, frac_part)
        .parse()
        .map_err(AmountParseError::IntParseError)?;
    Ok(Decimal::new(whole_number, frac_part.len() as u32))
}

/// Create a `NaiveDate` from a MT940 date.
///
/// MT940 has a weird date format in the form of YYMMDD. Since it has a shortened year, the
/// assumption is made that all statements are in the year 20XX. Dates before 2000 or after
/// 2099 cannot be represented in the wire format and will come out wrong.
pub fn date_from_mt940_date(s: &str) -> Result<NaiveDate, DateParseError> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::Malformed(s.to_string()));
    }
    let (year, month, day) = (&s[0..2], &s[2..4], &s[4..6]);
    let full_year = format!("20{}", year);
    NaiveDate::from_ymd_opt(
        full_year.parse().unwrap(),
        month.parse().unwrap(),
        day.parse().unwrap(),
    )
    .ok_or_else(|| DateParseError::OutOfRange {
        year: full_year,
        month: month.to_string(),
        day: day.to_string(),
    })
}

/// Create a `NaiveDate` from a MT940 short date as found in `:61:` entry dates.
///
/// Short dates are MMDD without any year. The year is taken from the statement line's value
/// date. That assumption fails for statements spanning a year boundary where a value date of
/// 2018-12-31 can carry an entry date of 0101 which then lands in 2018 instead of 2019.
pub fn date_from_mt940_short_date(s: &str, year: i32) -> Result<NaiveDate, DateParseError> {
    if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::Malformed(s.to_string()));
    }
    let (month, day) = (&s[0..2], &s[2..4]);
    NaiveDate::from_ymd_opt(year, month.parse().unwrap(), day.parse().unwrap()).ok_or_else(|| {
        DateParseError::OutOfRange {
            year: year.to_string(),
            month: month.to_string(),
            day: day.to_string(),
        }
    })
}
