#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! docqa-core
//!
//! Domain types, error taxonomy, provider traits, configuration, and the
//! first two pipeline stages: loading documents and splitting them into chunks.

pub mod config;
pub mod error;
pub mod loader;
pub mod splitter;
pub mod traits;
pub mod types;

pub use error::{Error, ErrorKind, Result};
