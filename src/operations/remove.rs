use crate::db::repository::TransactionRepository;
use crate::db::storage::KeyValueStorage;
use crate::models::transaction::Transaction;

/// Removes the transaction with `id`. An unknown id is not an error.
pub fn remove_transaction<S: KeyValueStorage>(
    repository: &mut TransactionRepository<S>,
    id: &str,
) -> Result<Option<Transaction>, String> {
    let id = id.trim();
    if id.is_empty() {
        return Err("Transaction ID cannot be empty.".to_string());
    }

    Ok(repository.remove(id))
}
