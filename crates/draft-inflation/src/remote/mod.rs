// Backend HTTP client and its wire payloads.

pub mod client;
pub mod payload;
