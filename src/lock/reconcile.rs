//! Version-lock reconciliation.
//!
//! Each lock group elects the highest version present among its members and
//! every member is moved to that version. Artifacts outside every lock group
//! pass through unchanged.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use super::LockGroupPattern;
use crate::package::{compare_versions, max_version};
use crate::resolver::{ResolvedArtifact, plan_key};

/// An artifact the plan will deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub packaging: String,
    /// Backing file, absent until an artifact at this exact version is fetched
    pub file: Option<PathBuf>,
}

impl PlanEntry {
    fn from_artifact(artifact: &ResolvedArtifact) -> Self {
        Self {
            group: artifact.group.clone(),
            artifact: artifact.artifact.clone(),
            version: artifact.version.clone(),
            packaging: artifact.packaging.clone(),
            file: Some(artifact.file.clone()),
        }
    }

    fn rewritten(artifact: &ResolvedArtifact, version: &str) -> Self {
        Self {
            version: version.to_string(),
            file: None,
            ..Self::from_artifact(artifact)
        }
    }

    /// `group:artifact:version@type`
    pub fn key(&self) -> String {
        plan_key(&self.group, &self.artifact, &self.version, &self.packaging)
    }
}

/// The deduplicated set of artifacts to deliver, keyed by
/// `group:artifact:version@type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionPlan {
    entries: BTreeMap<String, PlanEntry>,
}

impl ResolutionPlan {
    /// Add an entry. Inserting a key twice keeps a single entry; a backing
    /// file is kept from whichever insertion supplied one.
    pub fn insert(&mut self, entry: PlanEntry) {
        let file = entry.file.clone();
        let slot = self.entries.entry(entry.key()).or_insert(entry);
        if slot.file.is_none() {
            slot.file = file;
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.values()
    }

    /// Keys of entries that still need a file at their planned version.
    pub fn unfetched(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, e)| e.file.is_none())
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Set the backing file of an existing entry. Returns false for unknown keys.
    pub fn attach_file(&mut self, key: &str, file: PathBuf) -> bool {
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.file = Some(file);
                true
            }
            None => false,
        }
    }

    /// Backing files in plan order.
    pub fn files(&self) -> Vec<PathBuf> {
        self.entries.values().filter_map(|e| e.file.clone()).collect()
    }
}

/// A version override applied to one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModificationRecord {
    /// `group:artifact:version@type` as resolved
    pub original: String,
    /// `group:artifact:version@type` after locking
    pub modified: String,
}

impl fmt::Display for ModificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} --> {}", self.original, self.modified)
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub plan: ResolutionPlan,
    pub modifications: Vec<ModificationRecord>,
}

/// Lock every family onto its highest version.
///
/// An artifact belongs to the first group, in list order, that matches its
/// `group:artifact`. Fails if a family member has a non-numeric version.
#[tracing::instrument(skip_all)]
pub fn reconcile(
    artifacts: &[ResolvedArtifact],
    groups: &[LockGroupPattern],
) -> Result<Reconciliation> {
    let owners: Vec<Option<usize>> = artifacts
        .iter()
        .map(|a| {
            let key = a.versionless_key();
            groups.iter().position(|g| g.matches(&key))
        })
        .collect();

    let mut result = Reconciliation::default();

    for (artifact, _) in artifacts.iter().zip(&owners).filter(|(_, o)| o.is_none()) {
        result.plan.insert(PlanEntry::from_artifact(artifact));
    }

    for (index, group) in groups.iter().enumerate() {
        let candidates: Vec<&ResolvedArtifact> = artifacts
            .iter()
            .zip(&owners)
            .filter(|(_, owner)| **owner == Some(index))
            .map(|(a, _)| a)
            .collect();
        if candidates.is_empty() {
            debug!("Lock group {} has no members", group.name());
            continue;
        }

        let versions: Vec<&str> = candidates.iter().map(|a| a.version.as_str()).collect();
        let Some(elected) = max_version(&versions)
            .with_context(|| format!("Cannot lock versions of group '{}'", group.name()))?
        else {
            continue;
        };
        debug!(
            "Lock group {}: {} member(s) locked to {}",
            group.name(),
            candidates.len(),
            elected
        );

        for artifact in candidates {
            // 1.02 and 1.2 are the same version; keep the spelling that was resolved.
            if compare_versions(&artifact.version, &elected)? == Ordering::Equal {
                result.plan.insert(PlanEntry::from_artifact(artifact));
                continue;
            }
            let entry = PlanEntry::rewritten(artifact, &elected);
            let record = ModificationRecord {
                original: artifact.plan_key(),
                modified: entry.key(),
            };
            info!("Version locked: {}", record);
            result.modifications.push(record);
            result.plan.insert(entry);
        }
    }

    Ok(result)
}
