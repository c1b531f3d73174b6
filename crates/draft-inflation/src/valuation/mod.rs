// Valuation: expected prices, inflation aggregation, price-vs-pick regression.

pub mod inflation;
pub mod regression;
pub mod table;
