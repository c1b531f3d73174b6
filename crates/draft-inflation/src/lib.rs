// Library root: re-exports all modules so integration tests and the binary
// can reach the crate's public API.

pub mod app;
pub mod config;
pub mod db;
pub mod draft;
pub mod fetch;
pub mod filter;
pub mod poller;
pub mod protocol;
pub mod remote;
pub mod tui;
pub mod valuation;
