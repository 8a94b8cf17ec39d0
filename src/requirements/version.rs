//! Dotted numeric versions and the at-least comparison.
//!
//! A [`Version`] is an ordered list of non-negative integers taken from a
//! string like `"1.2.10"`. Comparison pads the shorter list with zeros, so
//! `"2"`, `"2.0"` and `"2.0.0"` are all equal, and each component compares
//! as a number (`"10"` is greater than `"9"`).
//!
//! # Example
//!
//! ```
//! use apptainer_setup::requirements::version::is_at_least;
//!
//! assert!(is_at_least("1.10.0", "1.9.9").unwrap());
//! assert!(is_at_least("1.2.0", "1.2").unwrap());
//! assert!(!is_at_least("1.2.0", "1.2.1").unwrap());
//! ```

use crate::error::{Result, SetupError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dotted numeric version with any number of components.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    /// Parse a dotted numeric version.
    ///
    /// Every component must be a non-empty run of ASCII digits. Anything
    /// else (pre-release tags, build metadata, whitespace, empty components)
    /// is rejected with [`SetupError::UnsupportedVersion`].
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(unsupported(input, "version is empty"));
        }

        let components = input
            .split('.')
            .map(|part| parse_component(input, part))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { components })
    }

    /// The parsed components, most significant first.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

fn parse_component(input: &str, part: &str) -> Result<u64> {
    if part.is_empty() {
        return Err(unsupported(input, "contains an empty component"));
    }
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unsupported(
            input,
            &format!("component '{}' is not a decimal integer", part),
        ));
    }
    // Always base 10: "08" is eight.
    part.parse::<u64>()
        .map_err(|_| unsupported(input, &format!("component '{}' is too large", part)))
}

fn unsupported(input: &str, reason: &str) -> SetupError {
    SetupError::UnsupportedVersion {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

impl FromStr for Version {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(u64::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            match self.component(i).cmp(&other.component(i)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

/// Whether `candidate` is greater than or equal to `minimum`.
///
/// Identical strings are accepted without parsing. Otherwise both sides
/// must be plain dotted numeric versions.
pub fn is_at_least(candidate: &str, minimum: &str) -> Result<bool> {
    if candidate == minimum {
        return Ok(true);
    }

    let candidate = Version::parse(candidate)?;
    let minimum = Version::parse(minimum)?;
    Ok(candidate >= minimum)
}
