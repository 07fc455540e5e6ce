//! Binance module - REST transport for spot and margin accounts

pub mod auth;
pub mod messages;
pub mod rest;

pub use rest::BinanceRestClient;
