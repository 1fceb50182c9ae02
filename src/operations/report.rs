use super::aggregate::Summary;
use super::calendar::month_title;
use crate::models::transaction::{Transaction, TransactionType};
use chrono::{NaiveDate, TimeZone};
use rust_decimal::Decimal;
use std::fmt::Write;

/// Formats a whole-unit amount with `.` thousand separators, e.g. `Rp 1.250.000`.
pub fn format_amount(amount: Decimal, currency: &str) -> String {
    let whole = amount.abs().round().to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount.is_sign_negative() && !amount.round().is_zero() {
        "-"
    } else {
        ""
    };

    if currency.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{} {}", sign, currency, grouped)
    }
}

/// `+Rp 100.000` for income, `-Rp 40.000` for expense.
pub fn format_transaction_amount(transaction: &Transaction, currency: &str) -> String {
    let sign = match transaction.transaction_type {
        TransactionType::Income => "+",
        TransactionType::Expense => "-",
    };
    format!("{}{}", sign, format_amount(transaction.amount, currency))
}

/// Balance with an explicit `+` when non-negative.
pub fn format_balance(balance: Decimal, currency: &str) -> String {
    if balance.is_sign_negative() && !balance.is_zero() {
        format_amount(balance, currency)
    } else {
        format!("+{}", format_amount(balance, currency))
    }
}

/// Short marker for calendar cells: `950`, `40k`, `2.5k`, `1.5M`.
pub fn format_compact(amount: Decimal) -> String {
    let value = amount.abs().round();
    let (scaled, suffix) = if value >= Decimal::from(1_000_000) {
        (value / Decimal::from(1_000_000), "M")
    } else if value >= Decimal::from(1_000) {
        (value / Decimal::from(1_000), "k")
    } else {
        (value, "")
    };
    format!("{}{}", scaled.round_dp(1).normalize(), suffix)
}

pub fn month_report(month: NaiveDate, summary: &Summary, count: usize, currency: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary for {}", month_title(month));
    let _ = writeln!(out, "  Transactions: {}", count);
    let _ = writeln!(out, "  Income:       +{}", format_amount(summary.income, currency));
    let _ = writeln!(out, "  Expense:      -{}", format_amount(summary.expense, currency));
    let _ = writeln!(out, "  Balance:      {}", format_balance(summary.balance(), currency));
    out
}

pub fn listing_report<Tz: TimeZone>(
    title: &str,
    transactions: &[&Transaction],
    currency: &str,
    tz: &Tz,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", title);

    if transactions.is_empty() {
        let _ = writeln!(out, "  (no transactions)");
        return out;
    }

    for transaction in transactions {
        let _ = writeln!(
            out,
            "  {}  {:<7}  {:>16}  {}  [{}]",
            transaction.day_in(tz).format("%Y-%m-%d"),
            transaction.transaction_type.as_str(),
            format_transaction_amount(transaction, currency),
            transaction.description,
            transaction.id,
        );
    }

    let summary = Summary::of(transactions.iter().copied());
    let _ = writeln!(out, "  Balance: {}", format_balance(summary.balance(), currency));
    out
}
