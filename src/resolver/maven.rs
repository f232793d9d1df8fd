//! Resolver over Maven-layout repositories.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::repository::{file_path, latest_version, metadata_path, packaging_from_pom};
use super::{Repository, Resolution, ResolvedArtifact, Resolver};
use crate::http::{HttpClient, is_not_found};
use crate::package::PackageSpec;
use crate::runtime::Runtime;

/// Looks up each specifier in an ordered list of repositories.
///
/// The first repository that hosts the artifact wins. Remote artifacts are
/// downloaded into the staging directory; local artifacts are used in place.
/// Only the requested artifacts are fetched, dependencies declared in their
/// POMs are not followed.
pub struct MavenResolver<R: Runtime> {
    runtime: R,
    http: HttpClient,
    repositories: Vec<Repository>,
    staging_dir: PathBuf,
}

impl<R: Runtime> MavenResolver<R> {
    pub fn new(
        runtime: R,
        http: HttpClient,
        repositories: Vec<Repository>,
        staging_dir: PathBuf,
    ) -> Self {
        Self {
            runtime,
            http,
            repositories,
            staging_dir,
        }
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Search every repository in order for one specifier.
    async fn resolve_spec(&self, spec: &PackageSpec) -> Option<ResolvedArtifact> {
        for repo in &self.repositories {
            match self.resolve_in(repo, spec).await {
                Ok(Some(artifact)) => {
                    debug!("Found {} in {}", artifact, repo);
                    return Some(artifact);
                }
                Ok(None) => debug!("{} not in {}", spec, repo),
                Err(e) => warn!("Failed to look up {} in {}: {:#}", spec, repo, e),
            }
        }
        None
    }

    async fn resolve_in(
        &self,
        repo: &Repository,
        spec: &PackageSpec,
    ) -> Result<Option<ResolvedArtifact>> {
        let version = match &spec.version {
            Some(v) => v.clone(),
            None => {
                let metadata = self
                    .read_text(repo, &metadata_path(&spec.group, &spec.artifact))
                    .await?;
                match metadata.as_deref().and_then(latest_version) {
                    Some(v) => v,
                    None => return Ok(None),
                }
            }
        };

        let packaging = match &spec.packaging {
            Some(p) => p.clone(),
            None => {
                let pom_path = file_path(&spec.group, &spec.artifact, &version, "pom");
                match self.read_text(repo, &pom_path).await? {
                    Some(pom) => packaging_from_pom(&pom),
                    None => return Ok(None),
                }
            }
        };

        let relative = file_path(&spec.group, &spec.artifact, &version, &packaging);
        // Staged under the repository layout so equal artifact names from
        // different groups do not collide.
        let dest = self.staging_dir.join(&relative);
        let Some(file) = self.fetch(repo, &relative, &dest).await? else {
            return Ok(None);
        };

        Ok(Some(ResolvedArtifact {
            group: spec.group.clone(),
            artifact: spec.artifact.clone(),
            version,
            packaging,
            file,
        }))
    }

    /// Read a text file from a repository. `None` if it does not exist.
    async fn read_text(&self, repo: &Repository, relative: &str) -> Result<Option<String>> {
        match repo {
            Repository::Remote(base) => {
                match self.http.get_text(&format!("{}/{}", base, relative)).await {
                    Ok(text) => Ok(Some(text)),
                    Err(e) if is_not_found(&e) => Ok(None),
                    Err(e) => Err(e),
                }
            }
            Repository::Local(root) => {
                let path = root.join(relative);
                if !self.runtime.exists(&path) {
                    return Ok(None);
                }
                self.runtime.read_to_string(&path).map(Some)
            }
        }
    }

    /// Locate an artifact file, downloading remote files to `dest`.
    async fn fetch(
        &self,
        repo: &Repository,
        relative: &str,
        dest: &Path,
    ) -> Result<Option<PathBuf>> {
        match repo {
            Repository::Remote(base) => {
                let url = format!("{}/{}", base, relative);
                info!("Downloading {}...", url);
                let result = self
                    .http
                    .download_file(&url, || {
                        if let Some(parent) = dest.parent() {
                            self.runtime.create_dir_all(parent).with_context(|| {
                                format!("Failed to create staging directory {:?}", parent)
                            })?;
                        }
                        self.runtime
                            .create_file(dest)
                            .with_context(|| format!("Failed to create {:?}", dest))
                    })
                    .await;
                match result {
                    Ok(_) => Ok(Some(dest.to_path_buf())),
                    Err(e) if is_not_found(&e) => Ok(None),
                    Err(e) => {
                        // Drop a partially written file so it cannot be mistaken for a result.
                        if self.runtime.exists(dest) {
                            let _ = self.runtime.remove_file(dest);
                        }
                        Err(e)
                    }
                }
            }
            Repository::Local(root) => {
                let path = root.join(relative);
                Ok(self.runtime.exists(&path).then_some(path))
            }
        }
    }
}

#[async_trait]
impl<R: Runtime> Resolver for MavenResolver<R> {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, specifiers: &BTreeSet<String>) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        for specifier in specifiers {
            let spec = match specifier.parse::<PackageSpec>() {
                Ok(spec) => spec,
                Err(e) => {
                    warn!("Skipping {}: {}", specifier, e);
                    continue;
                }
            };

            match self.resolve_spec(&spec).await {
                Some(artifact) => resolution.push(artifact),
                None => debug!("Could not resolve {}", specifier),
            }
        }

        info!(
            "Resolved {} of {} package(s)",
            resolution.artifacts.len(),
            specifiers.len()
        );
        Ok(resolution)
    }
}
