mod cli;
mod config;
mod db;
mod logging;
mod models;
mod operations;
mod ui;

use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Command};
use config::Config;
use db::repository::TransactionRepository;
use db::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use log::warn;
use operations::add::{add_transaction_from_input, parse_date};
use operations::aggregate::{filter_by_month, month_summary};
use operations::calendar::{first_of_month, month_title, parse_month};
use operations::edit::{TransactionChanges, edit_transaction};
use operations::remove::remove_transaction;
use operations::report::{format_transaction_amount, listing_report, month_report};
use operations::search::{TransactionFilter, daily_listing};
use std::process;

fn main() {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli);
    let interactive = matches!(cli.command, None | Some(Command::Calendar { .. }));

    if let Err(e) = logging::init_logging(config.log_destination(interactive).as_deref()) {
        eprintln!("{}", e);
    }

    if let Err(e) = run(cli.command, &config) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Opens the SQLite-backed store, or an in-memory one when the database is
/// unusable, so the app still runs for the session.
fn open_storage(config: &Config) -> Box<dyn KeyValueStorage> {
    match SqliteStorage::open(&config.db_path) {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!(
                "storage at {} unavailable, changes will not persist: {}",
                config.db_path.display(),
                e
            );
            Box::new(MemoryStorage::new())
        }
    }
}

fn month_or_current(month: Option<&str>) -> Result<NaiveDate, String> {
    match month {
        Some(raw) => parse_month(raw),
        None => Ok(first_of_month(Local::now().date_naive())),
    }
}

fn run(command: Option<Command>, config: &Config) -> Result<(), String> {
    let mut repository = TransactionRepository::load(open_storage(config), &config.storage_key);
    let currency = config.currency.as_str();

    match command.unwrap_or(Command::Calendar { month: None }) {
        Command::Calendar { month } => {
            let month = month.as_deref().map(parse_month).transpose()?;
            ui::run_calendar(repository, config, month)?;
        }
        Command::Add(args) => {
            let transaction = add_transaction_from_input(
                &mut repository,
                &args.date,
                &args.description,
                &args.amount,
                args.transaction_type,
                &Local,
            )?;
            println!(
                "Transaction added successfully: {} {} [{}]",
                transaction.description,
                format_transaction_amount(&transaction, currency),
                transaction.id
            );
        }
        Command::Edit(args) => {
            let changes = TransactionChanges {
                date: args.date,
                description: args.description,
                amount: args.amount,
                transaction_type: args.transaction_type,
            };
            let transaction = edit_transaction(&mut repository, &args.id, &changes, &Local)?;
            println!(
                "Transaction updated: {} {}",
                transaction.description,
                format_transaction_amount(&transaction, currency)
            );
        }
        Command::Remove { id } => match remove_transaction(&mut repository, &id)? {
            Some(removed) => println!(
                "Transaction removed successfully: {} {}",
                removed.description,
                format_transaction_amount(&removed, currency)
            ),
            None => println!("No transaction found with ID {}.", id.trim()),
        },
        Command::List { month } => {
            let month = month_or_current(month.as_deref())?;
            let transactions = filter_by_month(repository.list(), month, &Local);
            let title = format!("Transactions for {}", month_title(month));
            print!("{}", listing_report(&title, &transactions, currency, &Local));
        }
        Command::Day {
            date,
            search,
            transaction_type,
        } => {
            let day = parse_date(&date)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Date is required".to_string())?;
            let filter = TransactionFilter::new(search.as_deref().unwrap_or(""), transaction_type);
            let transactions =
                daily_listing(repository.list(), Some(day), &filter, config.daily_order, &Local);
            let title = format!("Transactions on {}", day.format("%A, %Y-%m-%d"));
            print!("{}", listing_report(&title, &transactions, currency, &Local));
        }
        Command::Summary { month } => {
            let month = month_or_current(month.as_deref())?;
            let count = filter_by_month(repository.list(), month, &Local).len();
            let summary = month_summary(repository.list(), month, &Local);
            print!("{}", month_report(month, &summary, count, currency));
        }
        Command::Search {
            text,
            transaction_type,
        } => {
            let filter = TransactionFilter::new(&text, transaction_type);
            let transactions = filter.apply(repository.list());
            let title = format!("Transactions matching '{}'", text.trim());
            print!("{}", listing_report(&title, &transactions, currency, &Local));
        }
    }

    Ok(())
}
