//! utmlinker - campaign link builder and conversion-event tracker
//!
//! This library provides the tracking pipeline behind the admissions marketing
//! site: UTM-tagged outbound links, and normalised conversion events forwarded
//! to an external analytics collector.
//!
//! # Features
//! - **cli**: Command-line interface (default)
//! - **http-sink**: Forward events to an HTTP collector endpoint (default)
//!
//! # Architecture
//! - `links`: UTM link generation, parsing and validation
//! - `tracking`: Event logger, injected page environment, collectors, auto-tracking
//! - `config`: Configuration management
//! - `interfaces`: Command-line interface
//! - `system`: Logging initialization

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod links;
pub mod system;
pub mod tracking;
