//! Two-pass resolution with an alternate artifact type.
//!
//! The first pass asks for every package exactly as requested. Packages
//! that produced no file and did not name a type are asked for again with
//! the `srcaar` type appended. The second pass covers the whole, partly
//! widened, request list.

use anyhow::Result;
use log::{debug, info};
use std::collections::{BTreeSet, HashSet};

use crate::package::{Coordinate, PackageSpec, versionless_name_from_file};
use crate::resolver::{Resolution, Resolver};

/// Artifact type probed when the default type is not found.
pub const FALLBACK_TYPE: &str = "srcaar";

/// One requested package and the specifier finally used for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The specifier as the user wrote it
    pub original: String,
    /// The specifier sent in the final pass
    pub effective: String,
}

impl Request {
    pub fn is_widened(&self) -> bool {
        self.original != self.effective
    }
}

/// Result of the two resolution passes.
#[derive(Debug, Clone, Default)]
pub struct FallbackOutcome {
    /// Requests in input order
    pub requests: Vec<Request>,
    /// Artifacts from both passes, without duplicates
    pub resolution: Resolution,
}

/// Versionless names of the files a resolution produced.
pub fn resolved_names(resolution: &Resolution) -> HashSet<String> {
    resolution
        .files
        .iter()
        .filter_map(|f| versionless_name_from_file(f))
        .collect()
}

/// Decide the final specifier for each request given the first-pass names.
pub fn widen_unresolved(requested: &[String], resolved: &HashSet<String>) -> Vec<Request> {
    requested
        .iter()
        .map(|original| {
            let unresolved = Coordinate::parse(original)
                .is_some_and(|c| !resolved.contains(&c.artifact));
            let effective = if unresolved && !PackageSpec::has_explicit_type(original) {
                PackageSpec::with_type(original, FALLBACK_TYPE)
            } else {
                original.clone()
            };
            Request {
                original: original.clone(),
                effective,
            }
        })
        .collect()
}

/// Resolve `requested`, retrying unresolved untyped packages as `srcaar`.
#[tracing::instrument(skip(resolver))]
pub async fn resolve_with_fallback<V: Resolver + ?Sized>(
    resolver: &V,
    requested: &[String],
) -> Result<FallbackOutcome> {
    let initial: BTreeSet<String> = requested.iter().cloned().collect();
    let mut resolution = resolver.resolve(&initial).await?;

    let requests = widen_unresolved(requested, &resolved_names(&resolution));
    for request in requests.iter().filter(|r| r.is_widened()) {
        info!("{} not found, trying {}", request.original, request.effective);
    }

    let widened: BTreeSet<String> = requests.iter().map(|r| r.effective.clone()).collect();
    debug!("Final resolution pass for {} specifier(s)", widened.len());
    resolution.merge(resolver.resolve(&widened).await?);

    Ok(FallbackOutcome {
        requests,
        resolution,
    })
}
