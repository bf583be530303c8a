//! env-plot - client and chart assembler for the env-server sensor API
//!
//! This library exposes the core modules for testing and reuse.

pub mod chart;
pub mod cli;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod envdata;
pub mod error;
pub mod services;
