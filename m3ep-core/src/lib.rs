pub mod classify;
pub mod date_range;
pub mod error;
pub mod series;
pub mod stats;
pub mod tier;
