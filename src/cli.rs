use crate::db::connection::DEFAULT_DB_PATH;
use crate::db::repository::TRANSACTIONS_KEY;
use crate::models::transaction::TransactionType;
use crate::operations::search::DailyOrder;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Personal finance calendar: record income and expenses by day and see
/// monthly totals.
#[derive(Parser, Debug)]
#[command(name = "fincal", version, about, long_about = None)]
pub struct Cli {
    /// File path to the SQLite database holding the key-value store.
    #[arg(long, env = "FINCAL_DB", default_value = DEFAULT_DB_PATH, global = true)]
    pub db_path: PathBuf,

    /// Key under which the transaction list is stored.
    #[arg(long, env = "FINCAL_STORAGE_KEY", default_value = TRANSACTIONS_KEY, global = true)]
    pub storage_key: String,

    /// Currency label printed in front of amounts.
    #[arg(long, env = "FINCAL_CURRENCY", default_value = "Rp", global = true)]
    pub currency: String,

    /// Ordering of the transactions listed for a single day.
    #[arg(long, value_enum, default_value_t = DailyOrder::IncomeFirst, global = true)]
    pub daily_order: DailyOrder,

    /// How long the loading screen stays up, in milliseconds.
    #[arg(long, default_value_t = 2500, global = true)]
    pub splash_ms: u64,

    /// Write log output to this file instead of the default destination.
    #[arg(long, env = "FINCAL_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Open the interactive calendar (default).
    Calendar {
        /// Month to open, as YYYY-MM.
        #[arg(long)]
        month: Option<String>,
    },
    /// Record a new transaction.
    Add(AddArgs),
    /// Change fields of an existing transaction.
    Edit(EditArgs),
    /// Delete a transaction by id.
    Remove {
        id: String,
    },
    /// List the transactions of a month.
    List {
        /// Month as YYYY-MM, defaults to the current month.
        #[arg(long)]
        month: Option<String>,
    },
    /// Show the transactions recorded on one day.
    Day {
        /// Day as YYYY-MM-DD.
        date: String,
        /// Only show descriptions containing this text.
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
    },
    /// Print income, expense and balance for a month.
    Summary {
        #[arg(long)]
        month: Option<String>,
    },
    /// Search all transactions by description.
    Search {
        text: String,
        #[arg(long = "type")]
        transaction_type: Option<TransactionType>,
    },
}

#[derive(Args, Debug, PartialEq)]
pub struct AddArgs {
    /// Day as YYYY-MM-DD.
    #[arg(long)]
    pub date: String,
    #[arg(long)]
    pub description: String,
    /// Whole amount, e.g. 150000 or 150.000.
    #[arg(long)]
    pub amount: String,
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    pub transaction_type: TransactionType,
}

#[derive(Args, Debug, PartialEq)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,
}
