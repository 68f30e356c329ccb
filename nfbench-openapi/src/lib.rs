//! OpenAPI processing for nfbench.
//!
//! Loads the 3GPP OpenAPI documents of a directory into a [`SpecSet`], from which the operation
//! [`Catalog`](nfbench_types::Catalog) and the user settings template are generated.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use nfbench_openapi::SpecSet;
//!
//! let specs = SpecSet::load_dir(Path::new("openapi")).unwrap();
//! let catalog = specs.catalog(Some("AUSF"));
//! catalog.save(Path::new("openapi/api_list.yaml")).unwrap();
//! ```

#![warn(missing_debug_implementations)]

pub mod definitions;
pub mod document;
pub mod example;
pub mod naming;
pub mod parse;
pub mod template;

pub use parse::{ParseError, SpecSet};
pub use template::{SETTINGS_HEADER, settings_template};
