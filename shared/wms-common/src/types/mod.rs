//! Shared Types

mod permission;
mod role;

pub use permission::{Permission, PermissionSet, MAX_PERMISSION_LEN};
pub use role::Role;
