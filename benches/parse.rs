#![feature(test)]

extern crate test;

use mt940_import::export::convert;
use mt940_import::parse_mt940;
use test::Bencher;

static LONG_STATEMENT: &str = include_str!("../tests/data/mt940/full/bank1.sta");
static SHORT_STATEMENT: &str = include_str!("../tests/data/mt940/full/rabobank.sta");
static MULTI_STATEMENT: &str = include_str!("../tests/data/mt940/full/multiaccounts.sta");

#[bench]
fn bench_long_statement(b: &mut Bencher) {
    b.iter(|| parse_mt940(&LONG_STATEMENT).unwrap());
}

#[bench]
fn bench_short_statement(b: &mut Bencher) {
    b.iter(|| parse_mt940(&SHORT_STATEMENT).unwrap());
}

#[bench]
fn bench_parse_and_convert(b: &mut Bencher) {
    b.iter(|| convert(&parse_mt940(&MULTI_STATEMENT).unwrap()));
}
