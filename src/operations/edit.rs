use super::add::{TransactionDraft, parse_amount, parse_date};
use crate::db::repository::TransactionRepository;
use crate::db::storage::KeyValueStorage;
use crate::models::transaction::{Transaction, TransactionType};
use chrono::TimeZone;

/// Field values to change on an existing transaction. `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct TransactionChanges {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub transaction_type: Option<TransactionType>,
}

/// Merges `changes` into the stored record, validates the result and
/// overwrites the whole record.
pub fn edit_transaction<S, Tz>(
    repository: &mut TransactionRepository<S>,
    id: &str,
    changes: &TransactionChanges,
    tz: &Tz,
) -> Result<Transaction, String>
where
    S: KeyValueStorage,
    Tz: TimeZone,
{
    let existing = repository
        .get(id.trim())
        .ok_or_else(|| format!("Transaction with ID {} not found", id.trim()))?;
    let mut draft = TransactionDraft::from_transaction(existing, tz);

    if let Some(ref date) = changes.date {
        draft.date = parse_date(date).map_err(|e| e.to_string())?;
    }
    if let Some(ref description) = changes.description {
        draft.description = description.clone();
    }
    if let Some(ref amount) = changes.amount {
        draft.amount = parse_amount(amount).map_err(|e| e.to_string())?;
    }
    if let Some(transaction_type) = changes.transaction_type {
        draft.transaction_type = transaction_type;
    }

    let transaction = draft.validate(tz).map_err(|e| e.to_string())?;
    repository
        .update(transaction.clone())
        .map_err(|e| format!("Failed to update transaction: {}", e))?;
    Ok(transaction)
}
