//! The resolution pipeline.
//!
//! resolve (as requested) → resolve (widened) → lock versions →
//! fetch locked versions → copy → report
//!
//! Every phase is awaited in turn; all state belongs to a single run.

use anyhow::Result;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::Path;

use crate::copy::copy_artifacts;
use crate::fallback::resolve_with_fallback;
use crate::lock::{LockGroupPattern, ResolutionPlan, reconcile};
use crate::report::ResolutionReport;
use crate::resolver::Resolver;
use crate::runtime::Runtime;

/// Resolve `packages`, copy the result into `dest` and report.
#[tracing::instrument(skip(resolver, runtime, groups))]
pub async fn run<V: Resolver + ?Sized, R: Runtime>(
    resolver: &V,
    runtime: &R,
    groups: &[LockGroupPattern],
    packages: &[String],
    dest: &Path,
) -> Result<ResolutionReport> {
    info!("Resolving {} package(s)", packages.len());
    let outcome = resolve_with_fallback(resolver, packages).await?;

    let mut reconciliation = reconcile(&outcome.resolution.artifacts, groups)?;
    fetch_locked_versions(resolver, &mut reconciliation.plan).await?;

    let files = reconciliation.plan.files();
    debug!(
        "Plan has {} entr(ies), {} with files",
        reconciliation.plan.len(),
        files.len()
    );
    let copied = copy_artifacts(runtime, &files, dest)?;

    Ok(ResolutionReport::build(
        &outcome.requests,
        copied,
        reconciliation.modifications,
    ))
}

/// Fetch files for plan entries whose version was changed by a lock group.
///
/// Entries the resolver cannot supply at the locked version keep no file and
/// later show up as missing.
pub async fn fetch_locked_versions<V: Resolver + ?Sized>(
    resolver: &V,
    plan: &mut ResolutionPlan,
) -> Result<()> {
    let unfetched: BTreeSet<String> = plan.unfetched().into_iter().collect();
    if unfetched.is_empty() {
        return Ok(());
    }

    debug!("Fetching {} locked version(s)", unfetched.len());
    let resolution = resolver.resolve(&unfetched).await?;
    for artifact in resolution.artifacts {
        plan.attach_file(&artifact.plan_key(), artifact.file);
    }

    for key in plan.unfetched() {
        warn!("Locked version {} is not available", key);
    }
    Ok(())
}
