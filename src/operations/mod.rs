pub mod add;
pub mod aggregate;
pub mod calendar;
pub mod edit;
pub mod remove;
pub mod report;
pub mod search;
