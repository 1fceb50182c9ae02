use crate::models::transaction::{Transaction, TransactionType};
use chrono::{Datelike, NaiveDate, TimeZone};
use rust_decimal::Decimal;

/// Income and expense totals over some set of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
}

impl Summary {
    pub fn of<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Summary::default();
        for transaction in transactions {
            summary.record(transaction);
        }
        summary
    }

    /// Totals saturate at the `Decimal` range instead of overflowing.
    pub fn record(&mut self, transaction: &Transaction) {
        match transaction.transaction_type {
            TransactionType::Income => {
                self.income = self.income.saturating_add(transaction.amount)
            }
            TransactionType::Expense => {
                self.expense = self.expense.saturating_add(transaction.amount)
            }
        }
    }

    pub fn balance(&self) -> Decimal {
        self.income.saturating_sub(self.expense)
    }

    pub fn is_empty(&self) -> bool {
        self.income.is_zero() && self.expense.is_zero()
    }
}

pub fn filter_by_month<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    reference: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    transactions
        .iter()
        .filter(|t| {
            let day = t.day_in(tz);
            day.year() == reference.year() && day.month() == reference.month()
        })
        .collect()
}

/// Transactions on the `reference` day. `None` selects nothing.
pub fn filter_by_day<'a, Tz: TimeZone>(
    transactions: &'a [Transaction],
    reference: Option<NaiveDate>,
    tz: &Tz,
) -> Vec<&'a Transaction> {
    let Some(reference) = reference else {
        return Vec::new();
    };

    transactions
        .iter()
        .filter(|t| t.day_in(tz) == reference)
        .collect()
}

pub fn sum_by_type<'a, I>(transactions: I, transaction_type: TransactionType) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.transaction_type == transaction_type)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

pub fn balance<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    Summary::of(transactions).balance()
}

pub fn month_summary<Tz: TimeZone>(
    transactions: &[Transaction],
    month: NaiveDate,
    tz: &Tz,
) -> Summary {
    Summary::of(filter_by_month(transactions, month, tz))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::tests::create_test_transaction;
    use chrono::{FixedOffset, Utc};
    use std::str::FromStr;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn scenario() -> Vec<Transaction> {
        vec![
            create_test_transaction("1", TransactionType::Income, 100000, (2024, 1, 5)),
            create_test_transaction("2", TransactionType::Expense, 40000, (2024, 1, 5)),
            create_test_transaction("3", TransactionType::Expense, 5000, (2024, 2, 1)),
        ]
    }

    #[test]
    fn test_january_scenario() {
        let transactions = scenario();

        let january = filter_by_month(&transactions, date(2024, 1, 20), &Utc);
        let ids: Vec<&str> = january.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);

        assert_eq!(
            sum_by_type(january.iter().copied(), TransactionType::Income),
            Decimal::new(100000, 0)
        );
        assert_eq!(
            sum_by_type(january.iter().copied(), TransactionType::Expense),
            Decimal::new(40000, 0)
        );
        assert_eq!(balance(january), Decimal::new(60000, 0));
    }

    #[test]
    fn test_filter_by_month_distinguishes_years() {
        let transactions = vec![
            create_test_transaction("1", TransactionType::Income, 1, (2023, 1, 5)),
            create_test_transaction("2", TransactionType::Income, 1, (2024, 1, 5)),
        ];

        let result = filter_by_month(&transactions, date(2024, 1, 1), &Utc);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "2");
    }

    #[test]
    fn test_balance_identity_holds_for_every_month() {
        let transactions = vec![
            create_test_transaction("1", TransactionType::Income, 250, (2024, 1, 31)),
            create_test_transaction("2", TransactionType::Expense, 900, (2024, 1, 1)),
            create_test_transaction("3", TransactionType::Expense, 15, (2024, 2, 29)),
            create_test_transaction("4", TransactionType::Income, 1000, (2024, 2, 1)),
            create_test_transaction("5", TransactionType::Income, 3, (2024, 12, 31)),
            create_test_transaction("6", TransactionType::Expense, 7, (2025, 12, 1)),
        ];

        for year in [2024, 2025] {
            for month in 1..=12 {
                let subset = filter_by_month(&transactions, date(year, month, 1), &Utc);
                let income = sum_by_type(subset.iter().copied(), TransactionType::Income);
                let expense = sum_by_type(subset.iter().copied(), TransactionType::Expense);
                assert_eq!(income - expense, balance(subset.iter().copied()));
            }
        }
    }

    #[test]
    fn test_filter_by_day() {
        let transactions = scenario();

        let result = filter_by_day(&transactions, Some(date(2024, 1, 5)), &Utc);
        assert_eq!(result.len(), 2);

        let result = filter_by_day(&transactions, Some(date(2024, 1, 6)), &Utc);
        assert!(result.is_empty());
    }

    #[test]
    fn test_filter_by_day_without_reference_is_empty() {
        let transactions = scenario();
        assert!(filter_by_day(&transactions, None, &Utc).is_empty());
    }

    #[test]
    fn test_filter_by_day_uses_local_calendar_day() {
        let transactions = vec![create_test_transaction(
            "1",
            TransactionType::Expense,
            10,
            (2024, 1, 31),
        )];
        // 09:00 UTC is 23:00 the previous evening at UTC-10.
        let honolulu = FixedOffset::west_opt(10 * 3600).unwrap();

        assert!(filter_by_day(&transactions, Some(date(2024, 1, 31)), &honolulu).is_empty());
        assert_eq!(
            filter_by_day(&transactions, Some(date(2024, 1, 30)), &honolulu).len(),
            1
        );
    }

    #[test]
    fn test_empty_list_aggregates_to_zero() {
        let transactions: Vec<Transaction> = Vec::new();

        assert!(filter_by_month(&transactions, date(2024, 1, 1), &Utc).is_empty());
        assert!(filter_by_day(&transactions, Some(date(2024, 1, 1)), &Utc).is_empty());
        assert_eq!(sum_by_type(&transactions, TransactionType::Income), Decimal::ZERO);
        assert_eq!(sum_by_type(&transactions, TransactionType::Expense), Decimal::ZERO);
        assert_eq!(balance(&transactions), Decimal::ZERO);
        assert!(month_summary(&transactions, date(2024, 1, 1), &Utc).is_empty());
    }

    #[test]
    fn test_month_summary() {
        let transactions = scenario();
        let summary = month_summary(&transactions, date(2024, 2, 10), &Utc);

        assert_eq!(summary.income, Decimal::ZERO);
        assert_eq!(summary.expense, Decimal::new(5000, 0));
        assert_eq!(summary.balance(), Decimal::new(-5000, 0));
    }

    #[test]
    fn test_oversized_stored_amounts_saturate() {
        let big = Decimal::from_str("50000000000000000000000000000").unwrap();
        let mut transactions = vec![
            create_test_transaction("1", TransactionType::Income, 1, (2024, 1, 5)),
            create_test_transaction("2", TransactionType::Income, 1, (2024, 1, 6)),
            create_test_transaction("3", TransactionType::Expense, 1, (2024, 1, 7)),
            create_test_transaction("4", TransactionType::Expense, 1, (2024, 1, 8)),
        ];
        for transaction in &mut transactions {
            transaction.amount = big;
        }

        let summary = month_summary(&transactions, date(2024, 1, 1), &Utc);
        assert_eq!(summary.income, Decimal::MAX);
        assert_eq!(summary.expense, Decimal::MAX);
        assert_eq!(summary.balance(), Decimal::ZERO);
        assert_eq!(sum_by_type(&transactions, TransactionType::Income), Decimal::MAX);

        let lopsided = &transactions[..2];
        assert_eq!(balance(lopsided), Decimal::MAX);
    }
}
