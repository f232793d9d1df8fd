//! Package coordinate parsing.
//!
//! A package specifier has the form `group:artifact[:version][@type]`.
//! Matching between what was requested and what a repository produced is
//! done on versionless names, so this module also knows how to recover a
//! versionless name from a file produced by a repository.

use anyhow::{Result, bail};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Separator between a specifier and its artifact type qualifier.
pub const TYPE_SEPARATOR: char = '@';

/// The minimal `group:artifact` identity of a specifier.
///
/// Specifiers with fewer than two colon-delimited components do not produce a
/// coordinate; they take no part in matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    /// The specifier exactly as it was given.
    pub raw: String,
}

impl Coordinate {
    /// Parse the leading `group:artifact` components of a specifier.
    ///
    /// Returns `None` when the specifier has fewer than two components.
    pub fn parse(specifier: &str) -> Option<Self> {
        let mut parts = specifier.split(':');
        let group = parts.next()?;
        let artifact = parts.next()?;
        Some(Self {
            group: group.to_string(),
            artifact: strip_type(artifact).to_string(),
            raw: specifier.to_string(),
        })
    }

    /// `group:artifact`
    pub fn versionless_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

/// Derive a versionless name from a resolved file name.
///
/// The extension is dropped and everything from the last `-` of the base name
/// is stripped, so `my-package-1.2.3.aar` yields `my-package`. A base name
/// without a hyphen yields `None`.
///
/// Artifact names that themselves end in a hyphenated word with no version
/// suffix (`foo-bar.aar`) are misread as `foo`.
pub fn versionless_name_from_file(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let hyphen = stem.rfind('-')?;
    Some(stem[..hyphen].to_string())
}

fn strip_type(component: &str) -> &str {
    match component.find(TYPE_SEPARATOR) {
        Some(pos) => &component[..pos],
        None => component,
    }
}

/// A fully parsed package specifier.
///
/// Format: `group:artifact[:version][@type]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageSpec {
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
    pub packaging: Option<String>,
}

impl PackageSpec {
    /// Whether the specifier string carries an explicit `@type` qualifier.
    pub fn has_explicit_type(specifier: &str) -> bool {
        specifier.contains(TYPE_SEPARATOR)
    }

    /// Append a type qualifier to a specifier string.
    pub fn with_type(specifier: &str, packaging: &str) -> String {
        format!("{}{}{}", specifier, TYPE_SEPARATOR, packaging)
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        if let Some(packaging) = &self.packaging {
            write!(f, "{}{}", TYPE_SEPARATOR, packaging)?;
        }
        Ok(())
    }
}

impl FromStr for PackageSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (coords, packaging) = match s.rfind(TYPE_SEPARATOR) {
            Some(pos) => {
                let packaging = &s[pos + 1..];
                if packaging.is_empty() {
                    bail!("Invalid specifier '{}': type after @ cannot be empty.", s);
                }
                (&s[..pos], Some(packaging.to_string()))
            }
            None => (s, None),
        };

        let parts: Vec<&str> = coords.split(':').collect();
        if parts.len() < 2 || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
            bail!(
                "Invalid specifier '{}'. Expected 'group:artifact[:version][@type]'.",
                s
            );
        }

        Ok(PackageSpec {
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts.get(2).map(|v| v.to_string()),
            packaging,
        })
    }
}

/// Split a semicolon-delimited package list, dropping empty entries.
pub fn parse_package_list(list: &str) -> Vec<String> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
