// src/lib.rs
//! Scrape, normalize and publish retail fuel prices for China's 34
//! provincial-level regions as a single JSON snapshot.

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;
pub mod model;
pub mod registry;
pub mod specs;

pub mod assemble;
pub mod normalize;
pub mod progress;
pub mod runner;
pub mod scrape;
pub mod source;
pub mod store;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod log;

pub use rust_decimal::Decimal;
