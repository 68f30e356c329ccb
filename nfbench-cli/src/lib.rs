//! The `nfbench` command line tool.
//!
//! `nfbench build` turns a directory of 3GPP OpenAPI documents into an API catalog and a settings
//! template. After the settings are filled in, `nfbench run` assembles a request, discovers the
//! target NF through the NRF and sends the request repeatedly while collecting latency statistics.
#![warn(missing_debug_implementations)]

pub mod assemble;
pub mod cli;
pub mod commands;
pub mod config;
pub mod observability;
pub mod report;
