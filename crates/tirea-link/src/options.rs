//! Conversion mode for links.

use crate::LinkResult;
use serde::{Deserialize, Serialize};

/// Controls conversion between plain and persistent representations at the
/// link boundary.
///
/// Both flags default to `true`. Missing fields in deserialized config take
/// their defaults:
///
/// ```
/// use tirea_link::LinkOptions;
///
/// let opts = LinkOptions::from_json(r#"{"return_plain": false}"#).unwrap();
/// assert!(!opts.return_plain);
/// assert!(opts.write_as_persistent);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Expose persistent values through the link as plain JSON.
    pub return_plain: bool,
    /// Deep-convert plain arrays/objects handed to the setter into
    /// persistent containers before splicing.
    pub write_as_persistent: bool,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            return_plain: true,
            write_as_persistent: true,
        }
    }
}

impl LinkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn return_plain(mut self, enabled: bool) -> Self {
        self.return_plain = enabled;
        self
    }

    #[must_use]
    pub fn write_as_persistent(mut self, enabled: bool) -> Self {
        self.write_as_persistent = enabled;
        self
    }

    /// Expose persistent containers as-is instead of converting them.
    #[must_use]
    pub fn retain_persistent(self) -> Self {
        self.return_plain(false)
    }

    /// Parse options from a JSON config fragment.
    pub fn from_json(text: &str) -> LinkResult<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
