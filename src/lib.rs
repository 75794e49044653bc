pub mod api;
pub mod clients;
pub mod config;
pub mod content;
pub mod dispatcher;
pub mod models;
pub mod senders;
pub mod utils;
