//! WMS Access
//!
//! Role permission management for the warehouse management system: the
//! permission dependency graph, the closure resolver that keeps role
//! permission sets consistent, and the role editor built on top of it.

pub mod config;
pub mod observability;
pub mod permissions;
