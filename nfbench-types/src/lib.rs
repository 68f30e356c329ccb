//! Shared types for nfbench.
//!
//! This crate holds the data model that connects the catalog builder, the request assembler and
//! the HTTP executor:
//!
//! - [`catalog`]: the persisted `NF -> Service -> API` lookup and its file format.
//! - [`settings`]: the user-edited settings file (`configuration.yaml`).
//! - [`plan`]: a fully resolved request, ready to be sent.
//! - [`profile`]: NF profiles as returned by the NRF discovery service.
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod plan;
pub mod profile;
pub mod settings;

pub use catalog::{ApiEntry, Catalog, CatalogError, Method, ParamDescriptor, ParamLocation};
pub use plan::ExecutionPlan;
pub use settings::{ConfigValue, SettingsFile, UserInputs};
