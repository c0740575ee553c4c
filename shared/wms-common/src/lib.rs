//! WMS Common Library
//!
//! Permission and role types shared by the access library and its callers.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
