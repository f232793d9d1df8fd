//! Maven repository locations and layout.

use anyhow::{Result, bail};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::package::{is_numeric_version, max_version};

/// Google's Maven repository (Android support, Play services, Firebase).
pub const GOOGLE_MAVEN: &str = "https://maven.google.com";

/// Maven Central.
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";

static RELEASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<release>\s*([^<\s]+)\s*</release>").expect("valid regex"));
static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<version>\s*([^<\s]+)\s*</version>").expect("valid regex"));
static PACKAGING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<packaging>\s*([^<\s]+)\s*</packaging>").expect("valid regex")
});

/// A repository to search, either remote or a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Repository {
    /// Base URL without a trailing slash
    Remote(String),
    /// Root directory of a Maven-layout tree
    Local(PathBuf),
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Repository::Remote(url) => write!(f, "{}", url),
            Repository::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

impl FromStr for Repository {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Repository location cannot be empty.");
        }
        if s.starts_with("http://") || s.starts_with("https://") {
            return Ok(Repository::Remote(s.trim_end_matches('/').to_string()));
        }
        let path = s.strip_prefix("file://").unwrap_or(s);
        Ok(Repository::Local(PathBuf::from(path)))
    }
}

/// The repositories searched when none are configured.
pub fn default_repositories() -> Vec<Repository> {
    vec![
        Repository::Remote(GOOGLE_MAVEN.to_string()),
        Repository::Remote(MAVEN_CENTRAL.to_string()),
    ]
}

/// `com/example/widget`
pub(crate) fn artifact_dir(group: &str, artifact: &str) -> String {
    format!("{}/{}", group.replace('.', "/"), artifact)
}

/// `com/example/widget/maven-metadata.xml`
pub(crate) fn metadata_path(group: &str, artifact: &str) -> String {
    format!("{}/maven-metadata.xml", artifact_dir(group, artifact))
}

/// `widget-1.0.aar`
pub(crate) fn file_name(artifact: &str, version: &str, extension: &str) -> String {
    format!("{}-{}.{}", artifact, version, extension)
}

/// `com/example/widget/1.0/widget-1.0.aar`
pub(crate) fn file_path(group: &str, artifact: &str, version: &str, extension: &str) -> String {
    format!(
        "{}/{}/{}",
        artifact_dir(group, artifact),
        version,
        file_name(artifact, version, extension)
    )
}

/// Pick the version to use from `maven-metadata.xml`.
///
/// The `<release>` element wins when it is numeric; otherwise the highest
/// numeric `<version>` entry is used. Non-numeric versions are skipped.
pub(crate) fn latest_version(metadata: &str) -> Option<String> {
    if let Some(release) = RELEASE_RE.captures(metadata).map(|c| c[1].to_string())
        && is_numeric_version(&release)
    {
        return Some(release);
    }

    let versions: Vec<String> = VERSION_RE
        .captures_iter(metadata)
        .map(|c| c[1].to_string())
        .filter(|v| is_numeric_version(v))
        .collect();
    max_version(&versions).ok().flatten()
}

/// The artifact extension declared by a POM.
///
/// Missing `<packaging>` means `jar`; OSGi `bundle` artifacts are jars too.
pub(crate) fn packaging_from_pom(pom: &str) -> String {
    match PACKAGING_RE.captures(pom).map(|c| c[1].to_string()) {
        None => "jar".to_string(),
        Some(p) if p == "bundle" => "jar".to_string(),
        Some(p) => p,
    }
}
