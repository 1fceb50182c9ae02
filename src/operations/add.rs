use crate::db::repository::{SaveOutcome, TransactionRepository};
use crate::db::storage::KeyValueStorage;
use crate::models::transaction::{Transaction, TransactionType, generate_id};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use thiserror::Error;

const MAX_DESCRIPTION_LEN: usize = 255;

/// Largest amount that survives the JSON number round trip exactly (2^53 - 1).
pub const MAX_AMOUNT: i64 = 9_007_199_254_740_991;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Description is required")]
    EmptyDescription,
    #[error("Description too long (max 255 characters)")]
    DescriptionTooLong,
    #[error("Amount is required and must be greater than zero")]
    MissingAmount,
    #[error("Amount cannot be negative")]
    NegativeAmount,
    #[error("Amount must be a whole number")]
    FractionalAmount,
    #[error("Amount too large (max 9007199254740991)")]
    AmountTooLarge,
    #[error("Invalid amount format '{0}'. Please provide a whole number.")]
    InvalidAmount(String),
    #[error("Date is required")]
    MissingDate,
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidDate(String),
}

/// Unvalidated form input for a transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDraft {
    pub id: Option<String>,
    pub transaction_type: TransactionType,
    pub description: String,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl TransactionDraft {
    pub fn for_day(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    pub fn from_transaction<Tz: TimeZone>(transaction: &Transaction, tz: &Tz) -> Self {
        Self {
            id: Some(transaction.id.clone()),
            transaction_type: transaction.transaction_type,
            description: transaction.description.clone(),
            amount: Some(transaction.amount),
            date: Some(transaction.day_in(tz)),
        }
    }

    pub fn validate<Tz: TimeZone>(&self, tz: &Tz) -> Result<Transaction, ValidationError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(ValidationError::DescriptionTooLong);
        }

        let amount = match self.amount {
            None => return Err(ValidationError::MissingAmount),
            Some(a) if a.is_zero() => return Err(ValidationError::MissingAmount),
            Some(a) if a.is_sign_negative() => return Err(ValidationError::NegativeAmount),
            Some(a) if !a.fract().is_zero() => return Err(ValidationError::FractionalAmount),
            Some(a) if a > Decimal::from(MAX_AMOUNT) => return Err(ValidationError::AmountTooLarge),
            Some(a) => a.normalize(),
        };

        let date = self.date.ok_or(ValidationError::MissingDate)?;

        let id = match self.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => generate_id(),
        };

        Ok(Transaction::new(
            id,
            self.transaction_type,
            description.to_string(),
            amount,
            start_of_day(date, tz),
        ))
    }
}

/// Local midnight of `date` in `tz`, as a UTC instant.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Parses a whole-unit amount. Accepts `100000`, `100.000`, `100,000` and an
/// optional `Rp` prefix. Empty input means "no amount".
pub fn parse_amount(input: &str) -> Result<Option<Decimal>, ValidationError> {
    let raw = input.trim();
    let digits = raw
        .strip_prefix("Rp")
        .or_else(|| raw.strip_prefix("rp"))
        .unwrap_or(raw)
        .trim();
    if digits.is_empty() {
        return Ok(None);
    }

    let (sign, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let grouped = unsigned
        .split(['.', ','])
        .skip(1)
        .all(|group| group.len() == 3 && group.chars().all(|c| c.is_ascii_digit()));
    let normalized = if grouped {
        unsigned.replace(['.', ','], "")
    } else {
        unsigned.to_string()
    };

    Decimal::from_str(&format!("{}{}", sign, normalized))
        .map(Some)
        .map_err(|_| ValidationError::InvalidAmount(raw.to_string()))
}

/// Parses `YYYY-MM-DD`. Empty input means "no date".
pub fn parse_date(input: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

/// Validates `draft` and stores it, updating the record when its id already exists.
pub fn submit_draft<S, Tz>(
    repository: &mut TransactionRepository<S>,
    draft: &TransactionDraft,
    tz: &Tz,
) -> Result<(Transaction, SaveOutcome), ValidationError>
where
    S: KeyValueStorage,
    Tz: TimeZone,
{
    let transaction = draft.validate(tz)?;
    let outcome = repository.save(transaction.clone());
    Ok((transaction, outcome))
}

pub fn add_transaction_from_input<S, Tz>(
    repository: &mut TransactionRepository<S>,
    date: &str,
    description: &str,
    amount: &str,
    transaction_type: TransactionType,
    tz: &Tz,
) -> Result<Transaction, String>
where
    S: KeyValueStorage,
    Tz: TimeZone,
{
    let draft = TransactionDraft {
        id: None,
        transaction_type,
        description: description.to_string(),
        amount: parse_amount(amount).map_err(|e| e.to_string())?,
        date: parse_date(date).map_err(|e| e.to_string())?,
    };

    let transaction = draft.validate(tz).map_err(|e| e.to_string())?;
    repository
        .add(transaction.clone())
        .map_err(|e| format!("Failed to add transaction: {}", e))?;
    Ok(transaction)
}
