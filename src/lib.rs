//! Executable trade quotes against a two-sided order book.
//!
//! The [`orderbook`] and [`quote`] modules hold the pure quoting core. The
//! remaining modules wire it to a market data source and an HTTP API.

pub mod api;
pub mod config;
pub mod errors;
pub mod exchanges;
pub mod models;
pub mod orderbook;
pub mod products;
pub mod quote;
pub mod service;
