pub mod convert;
pub mod rates;
pub mod setup;
pub mod symbols;
pub mod ui;
