//! Region names.

use std::borrow::Borrow;
use std::fmt;

use smol_str::SmolStr;

/// Name of a cache region, as used in region lookups, log fields and metric
/// labels.
///
/// Short names are stored inline. Borrows as `str`, so maps keyed by name
/// can be queried with a plain string.
///
/// ```
/// use regionbox_core::RegionName;
///
/// let name = RegionName::new("exampleRegion");
/// assert_eq!(name.full_path(), "/exampleRegion");
/// assert_eq!(name.to_string(), "exampleRegion");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionName(SmolStr);

impl RegionName {
    /// Wraps `name`.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    /// The name without leading separator.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the region as servers report it in errors.
    pub fn full_path(&self) -> String {
        format!("/{}", self.0)
    }
}

impl fmt::Display for RegionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for RegionName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl Borrow<str> for RegionName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}
