pub mod commands;
pub mod ledger;
pub mod model;
pub mod price;
