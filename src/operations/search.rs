use super::aggregate::filter_by_day;
use crate::models::transaction::{Transaction, TransactionType};
use chrono::{NaiveDate, TimeZone};
use clap::ValueEnum;

/// Description search combined with an optional type filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub text: String,
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn new(text: &str, transaction_type: Option<TransactionType>) -> Self {
        Self {
            text: text.to_string(),
            transaction_type,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.text.is_empty() || self.transaction_type.is_some()
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        if let Some(t) = self.transaction_type {
            if transaction.transaction_type != t {
                return false;
            }
        }

        let needle = self.text.to_lowercase();
        needle.is_empty() || transaction.description.to_lowercase().contains(&needle)
    }

    pub fn apply<'a, I>(&self, transactions: I) -> Vec<&'a Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions.into_iter().filter(|t| self.matches(t)).collect()
    }

    /// all -> income -> expense -> all
    pub fn cycle_type(&mut self) {
        self.transaction_type = match self.transaction_type {
            None => Some(TransactionType::Income),
            Some(TransactionType::Income) => Some(TransactionType::Expense),
            Some(TransactionType::Expense) => None,
        };
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.transaction_type = None;
    }
}

/// How records within one day are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DailyOrder {
    /// Income before expense; same-type records keep their input order.
    #[default]
    IncomeFirst,
    /// Input order.
    Insertion,
}

pub fn sort_daily(transactions: &mut [&Transaction], order: DailyOrder) {
    match order {
        DailyOrder::IncomeFirst => transactions.sort_by_key(|t| !t.is_income()),
        DailyOrder::Insertion => {}
    }
}

/// The list shown for one selected day.
pub fn daily_listing<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    day: Option<NaiveDate>,
    filter: &TransactionFilter,
    order: DailyOrder,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    let mut listing = filter.apply(filter_by_day(transactions, day, tz));
    sort_daily(&mut listing, order);
    listing
}
