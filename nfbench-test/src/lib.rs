//! Test utilities for nfbench.
//!
//! This crate provides an in-process HTTP server that stands in for the NRF and the NFs under test,
//! and a tracing setup for the test runner. See the modules for all available utilities.

pub mod server;
pub mod tracing;
