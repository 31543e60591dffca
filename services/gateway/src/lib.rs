//! TVL gateway
//!
//! Read-only HTTP service reporting Total Value Locked and liquidity over
//! market records, with exact integer arithmetic end to end.

#![recursion_limit = "256"]

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod router;
pub mod service;
pub mod state;
pub mod store;
pub mod telemetry;
