pub mod connection;
pub mod persisted;
pub mod repository;
pub mod storage;
