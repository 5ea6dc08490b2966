use chrono::NaiveDate;
use encoding_rs::WINDOWS_1251;
use feedsync_core::{
    CollectionError, Currency, Money, MoneyError, Transaction, TransactionId, TransactionKind,
    TransactionStatus, TransactionsCollection,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::str::FromStr;
use thiserror::Error;

use crate::currency::{resolve_currency, split_symbol};

/// Column positions in the bank's "movement list" export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedColumnMapping {
    pub account_column: usize,
    pub currency_column: usize,
    pub date_column: usize,
    pub reference_column: usize,
    pub description_column: usize,
    pub income_column: usize,
    pub outcome_column: usize,
}

impl Default for FeedColumnMapping {
    fn default() -> Self {
        Self {
            account_column: 1,
            currency_column: 2,
            date_column: 3,
            reference_column: 4,
            description_column: 5,
            income_column: 6,
            outcome_column: 7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedProfile {
    pub name: String,
    pub mapping: FeedColumnMapping,
    pub has_header: bool,
    pub delimiter: String,
    pub date_format: String,
    /// Reference value the bank prints for entries still on hold.
    pub hold_reference: String,
}

impl Default for FeedProfile {
    fn default() -> Self {
        Self {
            name: "movement list".to_string(),
            mapping: FeedColumnMapping::default(),
            has_header: true,
            delimiter: ";".to_string(),
            date_format: "%d.%m.%y".to_string(),
            hold_reference: "HOLD".to_string(),
        }
    }
}

impl FeedProfile {
    pub fn from_toml(toml_content: &str) -> Result<Self, FeedError> {
        toml::from_str(toml_content).map_err(|e| FeedError::Profile(e.to_string()))
    }
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Feed is neither UTF-8 nor {0}")]
    Encoding(&'static str),
    #[error("Invalid profile: {0}")]
    Profile(String),
    #[error("Missing column {column} on line {line}")]
    MissingColumn { column: usize, line: u64 },
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Currency symbol does not match column on line {line}: {symbol} vs {column}")]
    CurrencyMismatch {
        symbol: Currency,
        column: Currency,
        line: u64,
    },
    #[error(transparent)]
    UnknownCurrency(#[from] MoneyError),
    #[error(transparent)]
    Collection(#[from] CollectionError),
}

pub struct FeedLoader {
    profile: FeedProfile,
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new(FeedProfile::default())
    }
}

impl FeedLoader {
    pub fn new(profile: FeedProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &FeedProfile {
        &self.profile
    }

    pub fn load_from_reader<R: Read>(&self, mut data: R) -> Result<TransactionsCollection, FeedError> {
        let mut bytes = Vec::new();
        data.read_to_end(&mut bytes)?;
        self.load_from_bytes(&bytes)
    }

    /// Bank exports come in windows-1251; UTF-8 input is taken as is.
    pub fn load_from_bytes(&self, bytes: &[u8]) -> Result<TransactionsCollection, FeedError> {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return self.load_from_str(text);
        }
        let (text, had_errors) = WINDOWS_1251.decode_without_bom_handling(bytes);
        if had_errors {
            return Err(FeedError::Encoding(WINDOWS_1251.name()));
        }
        tracing::debug!(encoding = WINDOWS_1251.name(), "decoded legacy feed");
        self.load_from_str(&text)
    }

    pub fn load_from_str(&self, text: &str) -> Result<TransactionsCollection, FeedError> {
        let delimiter = self
            .profile
            .delimiter
            .as_bytes()
            .first()
            .copied()
            .unwrap_or(b';');
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.profile.has_header)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        self.parse(&mut reader)
    }

    fn parse<R: Read>(&self, reader: &mut csv::Reader<R>) -> Result<TransactionsCollection, FeedError> {
        let mapping = &self.profile.mapping;
        let mut transactions = Vec::new();

        for result in reader.records() {
            let record = result?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let field = |column: usize| {
                record
                    .get(column)
                    .map(str::trim)
                    .ok_or(FeedError::MissingColumn { column, line })
            };

            let date = parse_date(field(mapping.date_column)?, &self.profile.date_format)?;
            let currency = resolve_currency(field(mapping.currency_column)?)?;
            let reference = field(mapping.reference_column)?.to_string();

            let income = parse_amount(field(mapping.income_column)?, &currency, line)?;
            let outcome = parse_amount(field(mapping.outcome_column)?, &currency, line)?;
            let (kind, amount) = if income.is_zero() {
                (TransactionKind::Out, outcome)
            } else {
                (TransactionKind::In, income)
            };

            let status = if reference == self.profile.hold_reference {
                TransactionStatus::Hold
            } else {
                TransactionStatus::Committed
            };

            transactions.push(Transaction {
                id: TransactionId(transactions.len() as i64 + 1),
                date,
                account: field(mapping.account_column)?.to_string(),
                amount: Money::new(amount, currency),
                kind,
                status,
                reference,
                description: field(mapping.description_column)?.to_string(),
            });
        }

        Ok(TransactionsCollection::new(transactions)?)
    }
}

fn parse_date(s: &str, format: &str) -> Result<NaiveDate, FeedError> {
    if let Ok(date) = NaiveDate::parse_from_str(s, format) {
        return Ok(date);
    }

    for fmt in &["%d.%m.%Y", "%d.%m.%y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    Err(FeedError::InvalidDate(s.to_string()))
}

/// Parses `1480.00`, `1 480,00` or `1480,00 ₽`. An empty cell is zero.
fn parse_amount(s: &str, currency: &Currency, line: u64) -> Result<Decimal, FeedError> {
    let (number, symbol) = split_symbol(s);
    if let Some(symbol) = symbol {
        if &symbol != currency {
            return Err(FeedError::CurrencyMismatch {
                symbol,
                column: currency.clone(),
                line,
            });
        }
    }
    if number.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let normalized: String = number
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    let amount = Decimal::from_str(&normalized).map_err(|_| FeedError::InvalidAmount(s.to_string()))?;
    Ok(amount.abs())
}
