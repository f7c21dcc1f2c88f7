pub mod auction;
pub mod authentication;
pub mod bidding;
pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod message_broker;
pub mod notification;
pub mod query;
pub mod scheduler;
pub mod state;
pub mod store;
