//! Permission Identifier

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest accepted permission identifier, in bytes.
pub const MAX_PERMISSION_LEN: usize = 128;

/// Colon-separated lowercase segments.
static PERMISSION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_-]+(:[a-z0-9_-]+)*$").unwrap());

/// Capability identifier gating a UI action or server operation.
///
/// Identifiers are colon-separated lowercase segments, e.g.
/// `requests:edit:pending`. The first segment names the resource area.
///
/// This is narrower than an arbitrary string: uppercase letters, spaces,
/// empty segments and identifiers over [`MAX_PERMISSION_LEN`] bytes are
/// rejected, including when a graph or catalog document is deserialized.
/// Well-formed identifiers that a graph does not mention are still accepted
/// and behave as leaves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Permission(String);

/// Ordered set of permissions held by a role.
pub type PermissionSet = BTreeSet<Permission>;

impl Permission {
    /// Parse and validate a permission identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use wms_common::Permission;
    ///
    /// let perm = Permission::parse("requests:edit:pending").unwrap();
    /// assert_eq!(perm.resource(), "requests");
    /// assert!(Permission::parse("Requests::edit").is_err());
    /// ```
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();

        if value.is_empty() {
            return Err(Error::InvalidPermission {
                value,
                reason: "must not be empty",
            });
        }
        if value.len() > MAX_PERMISSION_LEN {
            return Err(Error::InvalidPermission {
                value,
                reason: "exceeds maximum length",
            });
        }
        if !PERMISSION_REGEX.is_match(&value) {
            return Err(Error::InvalidPermission {
                value,
                reason: "expected colon-separated segments of [a-z0-9_-]",
            });
        }

        Ok(Self(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Colon-separated segments of the identifier.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(':')
    }

    /// Resource area (first segment), used to group permissions.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.segments().next().unwrap_or_default()
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Permission {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for Permission {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.0
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Ord on the newtype matches `str` ordering, so set/map lookups by `&str` work.
impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_identifiers() {
        for id in [
            "requests:edit:pending",
            "requests:status:approve",
            "locations:view",
            "stock-settings:edit",
            "maintenance:backup_create",
            "admin",
        ] {
            assert!(Permission::parse(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_parse_rejects_malformed_identifiers() {
        for id in ["", ":", "requests:", ":edit", "requests::edit", "Requests:edit", "a b"] {
            assert!(Permission::parse(id).is_err(), "{id:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_rejects_overlong_identifier() {
        let id = "a".repeat(MAX_PERMISSION_LEN + 1);
        let err = Permission::parse(id).unwrap_err();
        assert!(err.to_string().contains("maximum length"));
    }

    #[test]
    fn test_resource_is_first_segment() {
        let perm = Permission::parse("requests:status:ordered").unwrap();
        assert_eq!(perm.resource(), "requests");
        assert_eq!(perm.segments().count(), 3);
    }

    #[test]
    fn test_set_lookup_by_str() {
        let mut set = PermissionSet::new();
        set.insert(Permission::parse("reports:export").unwrap());
        assert!(set.contains("reports:export"));
        assert!(!set.contains("reports:view"));
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let perm: Permission = serde_json::from_str("\"roles:manage\"").unwrap();
        assert_eq!(perm.as_str(), "roles:manage");
        assert_eq!(serde_json::to_string(&perm).unwrap(), "\"roles:manage\"");

        assert!(serde_json::from_str::<Permission>("\"Roles Manage\"").is_err());
    }
}
