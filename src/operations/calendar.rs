use super::aggregate::Summary;
use crate::models::transaction::Transaction;
use chrono::{Datelike, Days, Months, NaiveDate, TimeZone};
use std::collections::HashMap;

pub const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub summary: Summary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    pub month: NaiveDate,
    pub weeks: Vec<[CalendarDay; 7]>,
}

impl MonthGrid {
    pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    #[cfg(test)]
    pub fn day(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.days().find(|d| d.date == date)
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Shifts `date` by `delta` months, clamping the day to the target month's length.
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let shifted = if delta >= 0 {
        date.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

pub fn month_title(month: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[month.month0() as usize], month.year())
}

/// First and last day of the Monday-aligned weeks covering `month`.
pub fn grid_range(month: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = first_of_month(month);
    let last = last_of_month(month);

    let lead = first.weekday().num_days_from_monday() as u64;
    let trail = 6 - last.weekday().num_days_from_monday() as u64;

    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trail)).unwrap_or(last);
    (start, end)
}

pub fn build_month_grid<Tz: TimeZone>(
    transactions: &[Transaction],
    month: NaiveDate,
    today: NaiveDate,
    tz: &Tz,
) -> MonthGrid {
    let month = first_of_month(month);
    let (start, end) = grid_range(month);

    let mut per_day: HashMap<NaiveDate, Summary> = HashMap::new();
    for transaction in transactions {
        let day = transaction.day_in(tz);
        if day >= start && day <= end {
            per_day.entry(day).or_default().record(transaction);
        }
    }

    let mut weeks = Vec::new();
    let mut week_start = start;
    while week_start <= end {
        let mut week = [CalendarDay {
            date: week_start,
            in_month: false,
            is_today: false,
            summary: Summary::default(),
        }; 7];

        for (offset, slot) in week.iter_mut().enumerate() {
            let date = week_start
                .checked_add_days(Days::new(offset as u64))
                .unwrap_or(week_start);
            *slot = CalendarDay {
                date,
                in_month: date.year() == month.year() && date.month() == month.month(),
                is_today: date == today,
                summary: per_day.get(&date).copied().unwrap_or_default(),
            };
        }
        weeks.push(week);

        match week_start.checked_add_days(Days::new(7)) {
            Some(next) => week_start = next,
            None => break,
        }
    }

    MonthGrid { month, weeks }
}

pub fn parse_month(input: &str) -> Result<NaiveDate, String> {
    let raw = input.trim();
    NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
        .map_err(|_| format!("Invalid month '{}'. Use YYYY-MM.", raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::tests::create_test_transaction;
    use crate::models::transaction::TransactionType;
    use chrono::{Utc, Weekday};
    use rust_decimal::Decimal;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_grid_range_is_week_aligned() {
        // January 2024 starts on a Monday and ends on a Wednesday.
        let (start, end) = grid_range(date(2024, 1, 17));
        assert_eq!(start, date(2024, 1, 1));
        assert_eq!(end, date(2024, 2, 4));

        // September 2024 starts on a Sunday.
        let (start, end) = grid_range(date(2024, 9, 1));
        assert_eq!(start, date(2024, 8, 26));
        assert_eq!(end, date(2024, 10, 6));
    }

    #[test]
    fn test_grid_covers_month_with_full_weeks() {
        for month in 1..=12 {
            let grid = build_month_grid(&[], date(2025, month, 1), date(2025, 6, 1), &Utc);
            let first = grid.weeks.first().unwrap();
            let last = grid.weeks.last().unwrap();

            assert_eq!(first[0].date.weekday(), Weekday::Mon);
            assert_eq!(last[6].date.weekday(), Weekday::Sun);
            assert!(first[0].date <= date(2025, month, 1));
            assert!(last[6].date >= last_of_month(date(2025, month, 1)));
            assert!(grid.weeks.len() >= 4 && grid.weeks.len() <= 6);

            let in_month = grid.days().filter(|d| d.in_month).count();
            assert_eq!(in_month as u32, last_of_month(date(2025, month, 1)).day());
        }
    }

    #[test]
    fn test_grid_marks_today_and_totals() {
        let transactions = vec![
            create_test_transaction("1", TransactionType::Income, 100000, (2024, 1, 5)),
            create_test_transaction("2", TransactionType::Expense, 40000, (2024, 1, 5)),
            create_test_transaction("3", TransactionType::Expense, 5000, (2024, 2, 1)),
            create_test_transaction("4", TransactionType::Expense, 1, (2023, 12, 31)),
        ];

        let grid = build_month_grid(&transactions, date(2024, 1, 1), date(2024, 1, 5), &Utc);

        let fifth = grid.day(date(2024, 1, 5)).unwrap();
        assert!(fifth.is_today);
        assert!(fifth.in_month);
        assert_eq!(fifth.summary.income, Decimal::new(100000, 0));
        assert_eq!(fifth.summary.expense, Decimal::new(40000, 0));

        // Trailing days from February still carry their totals.
        let spill = grid.day(date(2024, 2, 1)).unwrap();
        assert!(!spill.in_month);
        assert_eq!(spill.summary.expense, Decimal::new(5000, 0));

        assert!(grid.day(date(2023, 12, 31)).is_none());
        assert_eq!(grid.days().filter(|d| d.is_today).count(), 1);
    }

    #[test]
    fn test_add_months_clamps_day() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(add_months(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(add_months(date(2024, 1, 15), -13), date(2022, 12, 15));
        assert_eq!(add_months(date(2024, 1, 15), 0), date(2024, 1, 15));
    }

    #[test]
    fn test_first_and_last_of_month() {
        assert_eq!(first_of_month(date(2024, 2, 17)), date(2024, 2, 1));
        assert_eq!(last_of_month(date(2024, 2, 17)), date(2024, 2, 29));
        assert_eq!(last_of_month(date(2023, 12, 1)), date(2023, 12, 31));
    }

    #[test]
    fn test_month_title() {
        assert_eq!(month_title(date(2024, 1, 5)), "January 2024");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2024-02"), Ok(date(2024, 2, 1)));
        assert!(parse_month("2024-13").is_err());
        assert!(parse_month("Feb 2024").unwrap_err().contains("YYYY-MM"));
    }
}
