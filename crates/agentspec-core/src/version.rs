//! Agent Spec format versions
//!
//! Versions are dotted triples compared componentwise and numerically.
//! `"25.4"` parses as `25.4.0`, so missing trailing components compare as zero.

use std::fmt;
use std::str::FromStr;

/// Root field carrying the format version
pub const VERSION_FIELD: &str = "agentspec_version";

/// Root field carrying the format version for legacy versions
pub const LEGACY_VERSION_FIELD: &str = "air_version";

/// A totally ordered Agent Spec format version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentSpecVersion {
    parts: [u32; 3],
}

impl AgentSpecVersion {
    /// Create version from its three components
    #[inline]
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            parts: [major, minor, patch],
        }
    }

    /// Major component
    #[inline]
    #[must_use]
    pub const fn major(&self) -> u32 {
        self.parts[0]
    }

    /// Minor component
    #[inline]
    #[must_use]
    pub const fn minor(&self) -> u32 {
        self.parts[1]
    }

    /// Patch component
    #[inline]
    #[must_use]
    pub const fn patch(&self) -> u32 {
        self.parts[2]
    }
}

impl fmt::Display for AgentSpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.parts[0], self.parts[1], self.parts[2])
    }
}

impl FromStr for AgentSpecVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError::Empty);
        }

        let mut parts = [0u32; 3];
        for (index, segment) in trimmed.split('.').enumerate() {
            if index >= parts.len() {
                return Err(VersionParseError::TooManyComponents(s.to_string()));
            }
            if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::InvalidComponent {
                    version: s.to_string(),
                    component: segment.to_string(),
                });
            }
            parts[index] = segment
                .parse()
                .map_err(|_| VersionParseError::InvalidComponent {
                    version: s.to_string(),
                    component: segment.to_string(),
                })?;
        }

        Ok(Self { parts })
    }
}

/// Errors while parsing a version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    /// Empty version string
    #[error("empty version string")]
    Empty,

    /// More than three dotted components
    #[error("version '{0}' has more than three components")]
    TooManyComponents(String),

    /// A component is empty or not numeric
    #[error("version '{version}' has invalid component '{component}'")]
    InvalidComponent { version: String, component: String },
}

/// The set of versions a schema recognizes
///
/// Legacy versions are written with [`LEGACY_VERSION_FIELD`] instead of
/// [`VERSION_FIELD`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSet {
    known: Vec<AgentSpecVersion>,
    legacy: Vec<AgentSpecVersion>,
}

impl VersionSet {
    /// Create a version set
    ///
    /// Versions are kept sorted; legacy versions are added to the known set.
    #[must_use]
    pub fn new(
        known: impl IntoIterator<Item = AgentSpecVersion>,
        legacy: impl IntoIterator<Item = AgentSpecVersion>,
    ) -> Self {
        let mut legacy: Vec<_> = legacy.into_iter().collect();
        legacy.sort_unstable();
        legacy.dedup();

        let mut known: Vec<_> = known.into_iter().chain(legacy.iter().copied()).collect();
        known.sort_unstable();
        known.dedup();

        Self { known, legacy }
    }

    /// Check if version is recognized
    #[inline]
    #[must_use]
    pub fn is_recognized(&self, version: AgentSpecVersion) -> bool {
        self.known.binary_search(&version).is_ok()
    }

    /// Check if version is written with the legacy field name
    #[inline]
    #[must_use]
    pub fn is_legacy(&self, version: AgentSpecVersion) -> bool {
        self.legacy.binary_search(&version).is_ok()
    }

    /// Latest recognized version, or [`AgentSpecVersion::LATEST`] for an empty set
    #[must_use]
    pub fn latest(&self) -> AgentSpecVersion {
        self.known.last().copied().unwrap_or(AgentSpecVersion::LATEST)
    }

    /// Root field name used for `version`
    #[inline]
    #[must_use]
    pub fn version_field_name(&self, version: AgentSpecVersion) -> &'static str {
        if self.is_legacy(version) {
            LEGACY_VERSION_FIELD
        } else {
            VERSION_FIELD
        }
    }

    /// All recognized versions, oldest first
    #[inline]
    #[must_use]
    pub fn versions(&self) -> &[AgentSpecVersion] {
        &self.known
    }
}

impl Default for VersionSet {
    fn default() -> Self {
        Self::new(
            [
                AgentSpecVersion::V25_4_0,
                AgentSpecVersion::V25_4_1,
                AgentSpecVersion::V25_4_2,
                AgentSpecVersion::V26_1_0,
            ],
            [AgentSpecVersion::V25_3_0, AgentSpecVersion::V25_3_1],
        )
    }
}

impl AgentSpecVersion {
    /// 25.3.0 (legacy)
    pub const V25_3_0: Self = Self::new(25, 3, 0);
    /// 25.3.1 (legacy)
    pub const V25_3_1: Self = Self::new(25, 3, 1);
    /// 25.4.0
    pub const V25_4_0: Self = Self::new(25, 4, 0);
    /// 25.4.1
    pub const V25_4_1: Self = Self::new(25, 4, 1);
    /// 25.4.2
    pub const V25_4_2: Self = Self::new(25, 4, 2);
    /// 26.1.0
    pub const V26_1_0: Self = Self::new(26, 1, 0);
    /// Latest version known to this crate
    pub const LATEST: Self = Self::V26_1_0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn v(s: &str) -> AgentSpecVersion {
        s.parse().unwrap()
    }

    #[test]
    fn parse_full_triple() {
        let version = v("25.4.1");
        assert_eq!(version.major(), 25);
        assert_eq!(version.minor(), 4);
        assert_eq!(version.patch(), 1);
        assert_eq!(version.to_string(), "25.4.1");
    }

    #[test]
    fn missing_components_are_zero() {
        assert_eq!(v("25.4"), v("25.4.0"));
        assert_eq!(v("26"), AgentSpecVersion::new(26, 0, 0));
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        assert!(v("25.10.0") > v("25.9.0"));
        assert!(v("25.4.10") > v("25.4.2"));
        assert!(v("100.0.0") > v("99.99.99"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<AgentSpecVersion>(), Err(VersionParseError::Empty));
        assert!(matches!(
            "1.2.3.4".parse::<AgentSpecVersion>(),
            Err(VersionParseError::TooManyComponents(_))
        ));
        assert!("1..2".parse::<AgentSpecVersion>().is_err());
        assert!("1.x.2".parse::<AgentSpecVersion>().is_err());
        assert!("-1.0.0".parse::<AgentSpecVersion>().is_err());
    }

    #[test]
    fn default_set_flags_legacy_versions() {
        let set = VersionSet::default();
        assert!(set.is_recognized(AgentSpecVersion::V25_3_0));
        assert!(set.is_legacy(AgentSpecVersion::V25_3_1));
        assert!(!set.is_legacy(AgentSpecVersion::V25_4_0));
        assert!(!set.is_recognized(v("24.1.0")));
        assert_eq!(set.latest(), AgentSpecVersion::LATEST);
        assert_eq!(set.version_field_name(AgentSpecVersion::V25_3_0), LEGACY_VERSION_FIELD);
        assert_eq!(set.version_field_name(AgentSpecVersion::V25_4_2), VERSION_FIELD);
    }

    proptest! {
        #[test]
        fn prop_order_matches_tuple_order(
            a in (0u32..200, 0u32..200, 0u32..200),
            b in (0u32..200, 0u32..200, 0u32..200),
        ) {
            let va = AgentSpecVersion::new(a.0, a.1, a.2);
            let vb = AgentSpecVersion::new(b.0, b.1, b.2);
            prop_assert_eq!(va.cmp(&vb), a.cmp(&b));
        }

        #[test]
        fn prop_display_parses_back(major in 0u32..1000, minor in 0u32..1000, patch in 0u32..1000) {
            let version = AgentSpecVersion::new(major, minor, patch);
            prop_assert_eq!(version.to_string().parse::<AgentSpecVersion>().unwrap(), version);
        }
    }
}
