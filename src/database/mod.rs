pub mod connection;
pub mod dedup;
pub mod models;
