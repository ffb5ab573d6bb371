//! Core library for the `thrash` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration loading, the bounded request dispatcher, and
//! single-writer outcome aggregation with latency histograms. The primary
//! user-facing interface is the `thrash` command-line application; library
//! APIs may evolve as the CLI grows.
pub mod args;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
