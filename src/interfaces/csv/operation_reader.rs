use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One line of the operations file. `create`, `alter-limit`, `debit`,
/// `credit`, `submit-debit` and `submit-credit` require an amount; `get`
/// and `cancel` ignore it.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Create,
    Get,
    AlterLimit,
    Cancel,
    Debit,
    Credit,
    SubmitDebit,
    SubmitCredit,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Operation {
    pub op: OperationKind,
    pub account: String,
    /// Parsed from the raw string so amounts never take a floating-point
    /// round-trip; scale is preserved exactly.
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
}

/// Reads ledger operations from a CSV source.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating missing trailing
/// fields, and yields operations lazily so large files stream.
pub struct OperationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> OperationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn operations(self) -> impl Iterator<Item = Result<Operation>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
