//! Repository resolver abstraction.
//!
//! The resolution engine only ever talks to a [`Resolver`]: given a set of
//! specifiers it returns the artifacts it could locate and silently omits
//! the ones it could not. [`MavenResolver`] is the production implementation
//! over remote and local Maven-layout repositories.

mod maven;
mod repository;

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::PathBuf;

pub use maven::MavenResolver;
pub use repository::{GOOGLE_MAVEN, MAVEN_CENTRAL, Repository, default_repositories};

use crate::package::TYPE_SEPARATOR;

/// A concrete artifact located by a resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedArtifact {
    pub group: String,
    pub artifact: String,
    pub version: String,
    /// Artifact type, e.g. `aar`, `jar` or `srcaar`
    pub packaging: String,
    /// Backing file on disk
    pub file: PathBuf,
}

impl ResolvedArtifact {
    /// `group:artifact`
    pub fn versionless_key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    /// `group:artifact:version@type`, the key used in a resolution plan.
    pub fn plan_key(&self) -> String {
        plan_key(&self.group, &self.artifact, &self.version, &self.packaging)
    }
}

impl fmt::Display for ResolvedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.plan_key())
    }
}

/// Build a `group:artifact:version@type` key.
pub fn plan_key(group: &str, artifact: &str, version: &str, packaging: &str) -> String {
    format!(
        "{}:{}:{}{}{}",
        group, artifact, version, TYPE_SEPARATOR, packaging
    )
}

/// The output of one resolution request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    pub files: Vec<PathBuf>,
    pub artifacts: Vec<ResolvedArtifact>,
}

impl Resolution {
    /// Record a resolved artifact and its backing file.
    pub fn push(&mut self, artifact: ResolvedArtifact) {
        self.files.push(artifact.file.clone());
        self.artifacts.push(artifact);
    }

    /// Append the artifacts of `other` that are not already present.
    pub fn merge(&mut self, other: Resolution) {
        let mut seen: HashSet<String> = self.artifacts.iter().map(|a| a.plan_key()).collect();
        for artifact in other.artifacts {
            if seen.insert(artifact.plan_key()) {
                self.push(artifact);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Trait for repository resolvers.
///
/// Implementations must be lenient: a specifier that cannot be located is
/// left out of the returned [`Resolution`] rather than reported as an error.
/// Errors are reserved for failures that make the whole request meaningless.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve a set of `group:artifact[:version][@type]` specifiers.
    async fn resolve(&self, specifiers: &BTreeSet<String>) -> Result<Resolution>;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a resolved artifact backed by `/repo/<artifact>-<version>.<type>`.
    pub fn artifact(
        group: &str,
        artifact: &str,
        version: &str,
        packaging: &str,
    ) -> ResolvedArtifact {
        ResolvedArtifact {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            packaging: packaging.to_string(),
            file: PathBuf::from(format!("/repo/{}-{}.{}", artifact, version, packaging)),
        }
    }

    pub fn resolution(artifacts: Vec<ResolvedArtifact>) -> Resolution {
        let mut resolution = Resolution::default();
        for a in artifacts {
            resolution.push(a);
        }
        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::artifact;
    use super::*;

    #[test]
    fn test_resolved_artifact_keys() {
        let a = artifact("com.example", "widget", "1.0", "aar");
        assert_eq!(a.versionless_key(), "com.example:widget");
        assert_eq!(a.plan_key(), "com.example:widget:1.0@aar");
        assert_eq!(a.to_string(), "com.example:widget:1.0@aar");
    }

    #[test]
    fn test_resolution_push_tracks_files() {
        let mut resolution = Resolution::default();
        assert!(resolution.is_empty());
        resolution.push(artifact("com.example", "widget", "1.0", "aar"));
        assert_eq!(resolution.files, vec![PathBuf::from("/repo/widget-1.0.aar")]);
        assert!(!resolution.is_empty());
    }

    #[test]
    fn test_resolution_merge_skips_duplicates() {
        let mut first = Resolution::default();
        first.push(artifact("com.example", "widget", "1.0", "aar"));

        let mut second = Resolution::default();
        second.push(artifact("com.example", "widget", "1.0", "aar"));
        second.push(artifact("com.example", "gadget", "2.0", "srcaar"));

        first.merge(second);
        assert_eq!(first.artifacts.len(), 2);
        assert_eq!(first.files.len(), 2);
        assert_eq!(first.artifacts[1].plan_key(), "com.example:gadget:2.0@srcaar");
    }
}
