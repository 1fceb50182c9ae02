use super::persisted::PersistedStore;
use super::storage::KeyValueStorage;
use crate::models::transaction::Transaction;
use log::info;
use thiserror::Error;

pub const TRANSACTIONS_KEY: &str = "transactions";

#[derive(Error, Debug, PartialEq)]
pub enum RepositoryError {
    #[error("Transaction with ID {0} already exists")]
    DuplicateId(String),
    #[error("Transaction with ID {0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Added,
    Updated,
}

/// Owner of the transaction list.
///
/// The list lives in a [`PersistedStore`] under a single key; every mutation
/// builds the next list and hands it to [`TransactionRepository::commit`].
pub struct TransactionRepository<S> {
    store: PersistedStore<Vec<Transaction>, S>,
}

impl<S: KeyValueStorage> TransactionRepository<S> {
    pub fn load(storage: S, key: &str) -> Self {
        let repository = Self {
            store: PersistedStore::load(storage, key, Vec::new()),
        };
        info!(
            "loaded {} transactions from '{}'",
            repository.len(),
            repository.store.key()
        );
        repository
    }

    pub fn list(&self) -> &[Transaction] {
        self.store.value()
    }

    pub fn get(&self, id: &str) -> Option<&Transaction> {
        self.list().iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.list().is_empty()
    }

    pub fn add(&mut self, transaction: Transaction) -> Result<(), RepositoryError> {
        if self.get(&transaction.id).is_some() {
            return Err(RepositoryError::DuplicateId(transaction.id));
        }

        info!("adding transaction {}", transaction.id);
        let mut next = self.list().to_vec();
        next.push(transaction);
        self.commit(next);
        Ok(())
    }

    /// Replaces the record with the same id. No partial patching.
    pub fn update(&mut self, transaction: Transaction) -> Result<(), RepositoryError> {
        if self.get(&transaction.id).is_none() {
            return Err(RepositoryError::NotFound(transaction.id));
        }

        info!("updating transaction {}", transaction.id);
        let next = self
            .list()
            .iter()
            .map(|t| {
                if t.id == transaction.id {
                    transaction.clone()
                } else {
                    t.clone()
                }
            })
            .collect();
        self.commit(next);
        Ok(())
    }

    /// Update when the id is known, append otherwise.
    pub fn save(&mut self, transaction: Transaction) -> SaveOutcome {
        if self.get(&transaction.id).is_some() {
            // Existence was just checked.
            let _ = self.update(transaction);
            SaveOutcome::Updated
        } else {
            let _ = self.add(transaction);
            SaveOutcome::Added
        }
    }

    /// Removes the record with `id`. Absent ids are a no-op.
    pub fn remove(&mut self, id: &str) -> Option<Transaction> {
        let position = self.list().iter().position(|t| t.id == id)?;

        info!("removing transaction {}", id);
        let mut next = self.list().to_vec();
        let removed = next.remove(position);
        self.commit(next);
        Some(removed)
    }

    #[cfg(test)]
    pub fn into_storage(self) -> S {
        self.store.into_storage()
    }

    fn commit(&mut self, next: Vec<Transaction>) {
        self.store.set(next);
    }
}
