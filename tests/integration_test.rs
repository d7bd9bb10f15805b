extern crate mt940_import;

extern crate rstest;

#[macro_use]
extern crate pretty_assertions;

use mt940_import::export::convert;
use mt940_import::parse_mt940;
use rstest::rstest_parametrize;
use std::fs;
use std::path::PathBuf;

#[rstest_parametrize(
    statement_path,
    expected_entries,
    expected_transactions,
    case("bank1.sta", 1, 18),
    case("rabobank.sta", 1, 6),
    case("multiaccounts.sta", 2, 5)
)]
fn parse_and_convert_counts(
    statement_path: &str,
    expected_entries: usize,
    expected_transactions: usize,
) {
    let full_path = PathBuf::from(format!("tests/data/mt940/full/{}", statement_path));
    let input_data = fs::read_to_string(&full_path).unwrap();
    let file = parse_mt940(&input_data).unwrap();

    assert_eq!(expected_entries, file.entries.len());

    let n_parsed: usize = file.entries.iter().map(|e| e.transactions.len()).sum();
    assert_eq!(expected_transactions, n_parsed);

    // Count invariant: conversion drops nothing and duplicates nothing.
    let bank = convert(&file);
    assert_eq!(expected_transactions, bank.transactions.len());
}
