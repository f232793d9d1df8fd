//! Dotted numeric version comparison.
//!
//! Versions are compared component by component as integers. When one
//! version is a prefix of the other the longer one is greater, so
//! `1.2 < 1.2.0`. Only purely numeric versions are supported.

use std::cmp::Ordering;

/// Errors raised while comparing versions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// A version component is not a non-negative integer.
    NonNumeric { version: String, token: String },
    /// A version component does not fit in 64 bits.
    Overflow { version: String, token: String },
}

impl std::fmt::Display for VersionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionError::NonNumeric { version, token } => write!(
                f,
                "Unsupported version '{}': component '{}' is not numeric",
                version, token
            ),
            VersionError::Overflow { version, token } => write!(
                f,
                "Unsupported version '{}': component '{}' is too large",
                version, token
            ),
        }
    }
}

impl std::error::Error for VersionError {}

fn components(version: &str) -> Result<Vec<u64>, VersionError> {
    version
        .split('.')
        .map(|token| {
            if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionError::NonNumeric {
                    version: version.to_string(),
                    token: token.to_string(),
                });
            }
            // Only digits remain, so parsing can only fail on overflow.
            token.parse::<u64>().map_err(|_| VersionError::Overflow {
                version: version.to_string(),
                token: token.to_string(),
            })
        })
        .collect()
}

/// Whether every component of `version` is numeric.
pub fn is_numeric_version(version: &str) -> bool {
    components(version).is_ok()
}

/// Compare two dotted numeric versions.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    // Slice ordering is lexicographic with the shorter prefix first.
    Ok(components(a)?.cmp(&components(b)?))
}

/// Sort versions in ascending order. Equal versions keep their input order.
pub fn sort_versions<S: AsRef<str>>(versions: &[S]) -> Result<Vec<String>, VersionError> {
    let mut parsed = versions
        .iter()
        .map(|v| Ok((components(v.as_ref())?, v.as_ref().to_string())))
        .collect::<Result<Vec<_>, VersionError>>()?;
    parsed.sort_by(|(a, _), (b, _)| a.cmp(b));
    Ok(parsed.into_iter().map(|(_, v)| v).collect())
}

/// The maximal version, i.e. the last element of [`sort_versions`].
pub fn max_version<S: AsRef<str>>(versions: &[S]) -> Result<Option<String>, VersionError> {
    Ok(sort_versions(versions)?.pop())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_numeric_not_lexical() {
        assert_eq!(compare_versions("1.10", "1.9").unwrap(), Ordering::Greater);
        assert_eq!(compare_versions("2.0", "10.0").unwrap(), Ordering::Less);
        assert_eq!(compare_versions("26.0.1", "26.0.1").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_compare_longer_prefix_is_greater() {
        assert_eq!(compare_versions("1.2", "1.2.0").unwrap(), Ordering::Less);
        assert_eq!(compare_versions("1.2.0", "1.2").unwrap(), Ordering::Greater);
        assert_eq!(compare_versions("1", "1.0.0.0").unwrap(), Ordering::Less);
    }

    #[test]
    fn test_compare_first_difference_decides() {
        assert_eq!(compare_versions("1.3", "1.2.9").unwrap(), Ordering::Greater);
    }

    #[test]
    fn test_compare_leading_zeros() {
        assert_eq!(compare_versions("1.02", "1.2").unwrap(), Ordering::Equal);
    }

    #[test]
    fn test_compare_non_numeric_fails() {
        let err = compare_versions("1.0-rc1", "1.0").unwrap_err();
        assert_eq!(
            err,
            VersionError::NonNumeric {
                version: "1.0-rc1".into(),
                token: "0-rc1".into()
            }
        );
        assert!(err.to_string().contains("not numeric"));

        assert!(compare_versions("1..2", "1.2").is_err());
        assert!(compare_versions("+1", "1").is_err());
    }

    #[test]
    fn test_compare_oversized_component_fails() {
        let err = compare_versions("1.99999999999999999999", "1.0").unwrap_err();
        assert_eq!(
            err,
            VersionError::Overflow {
                version: "1.99999999999999999999".into(),
                token: "99999999999999999999".into()
            }
        );
        assert!(err.to_string().contains("too large"));
        assert!(!err.to_string().contains("not numeric"));
    }

    #[test]
    fn test_sort_versions() {
        let sorted = sort_versions(&["1.1", "1.0", "1.2", "1.10", "1.2.0"]).unwrap();
        assert_eq!(sorted, vec!["1.0", "1.1", "1.2", "1.2.0", "1.10"]);
    }

    #[test]
    fn test_sort_versions_idempotent() {
        let once = sort_versions(&["3.0", "1.0.1", "2", "1.0", "1.00"]).unwrap();
        let twice = sort_versions(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_versions_propagates_error() {
        assert!(sort_versions(&["1.0", "beta"]).is_err());
    }

    #[test]
    fn test_max_version() {
        assert_eq!(
            max_version(&["26.0.0", "26.0.1", "25.4.0"]).unwrap().as_deref(),
            Some("26.0.1")
        );
        let empty: [&str; 0] = [];
        assert_eq!(max_version(&empty).unwrap(), None);
    }

    #[test]
    fn test_is_numeric_version() {
        assert!(is_numeric_version("11.8.0"));
        assert!(!is_numeric_version("11.8.0-SNAPSHOT"));
    }
}
