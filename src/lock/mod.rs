//! Version-locked package families.
//!
//! A lock group names a family of packages whose versions have to agree,
//! such as the Android support library. Groups are plain data: an ordered
//! list of inclusion/exclusion patterns over `group:artifact` strings.

mod reconcile;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::runtime::Runtime;

pub use reconcile::{ModificationRecord, Reconciliation, ResolutionPlan, reconcile};

/// Serializable form of a lock group, as read from a lock group file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockGroupSpec {
    pub name: String,
    /// Pattern a `group:artifact` must match to join the family
    pub include: String,
    /// Pattern that removes a `group:artifact` from the family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
}

impl LockGroupSpec {
    fn new(name: &str, include: &str, exclude: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            include: include.to_string(),
            exclude: exclude.map(String::from),
        }
    }
}

/// A compiled lock group.
#[derive(Debug, Clone)]
pub struct LockGroupPattern {
    name: String,
    include: Regex,
    exclude: Option<Regex>,
}

impl LockGroupPattern {
    pub fn new(name: &str, include: &str, exclude: Option<&str>) -> Result<Self> {
        let include = Regex::new(include)
            .with_context(|| format!("Invalid include pattern for lock group '{}'", name))?;
        let exclude = exclude
            .map(Regex::new)
            .transpose()
            .with_context(|| format!("Invalid exclude pattern for lock group '{}'", name))?;
        Ok(Self {
            name: name.to_string(),
            include,
            exclude,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `key` (`group:artifact`) belongs to this family.
    pub fn matches(&self, key: &str) -> bool {
        self.include.is_match(key) && !self.exclude.as_ref().is_some_and(|e| e.is_match(key))
    }
}

impl TryFrom<&LockGroupSpec> for LockGroupPattern {
    type Error = anyhow::Error;

    fn try_from(spec: &LockGroupSpec) -> Result<Self> {
        LockGroupPattern::new(&spec.name, &spec.include, spec.exclude.as_deref())
    }
}

/// The built-in lock groups, in evaluation order.
pub fn builtin_lock_group_specs() -> Vec<LockGroupSpec> {
    vec![
        // multidex is released on its own schedule
        LockGroupSpec::new(
            "android-support",
            r"^com\.android\.support:",
            Some(r"^com\.android\.support:(multidex|multidex-instrumentation)$"),
        ),
        LockGroupSpec::new("play-services", r"^com\.google\.android\.gms:", None),
        LockGroupSpec::new(
            "firebase",
            r"^com\.google\.firebase:",
            Some(r"^com\.google\.firebase:firebase-(jobdispatcher|crash-reporting)$"),
        ),
    ]
}

/// Compile the built-in lock groups.
pub fn builtin_lock_groups() -> Result<Vec<LockGroupPattern>> {
    builtin_lock_group_specs()
        .iter()
        .map(LockGroupPattern::try_from)
        .collect()
}

/// Load additional lock groups from a JSON file.
///
/// The file holds an array of `{"name", "include", "exclude"?}` objects.
#[tracing::instrument(skip(runtime))]
pub fn load_lock_groups<R: Runtime>(runtime: &R, path: &Path) -> Result<Vec<LockGroupPattern>> {
    let content = runtime
        .read_to_string(path)
        .with_context(|| format!("Failed to read lock groups from {:?}", path))?;
    let specs: Vec<LockGroupSpec> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse lock groups in {:?}", path))?;
    specs.iter().map(LockGroupPattern::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::PathBuf;

    fn find<'a>(groups: &'a [LockGroupPattern], name: &str) -> &'a LockGroupPattern {
        groups.iter().find(|g| g.name() == name).unwrap()
    }

    #[test]
    fn test_builtin_order() {
        let groups = builtin_lock_groups().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["android-support", "play-services", "firebase"]);
    }

    #[test]
    fn test_builtin_android_support() {
        let groups = builtin_lock_groups().unwrap();
        let support = find(&groups, "android-support");
        assert!(support.matches("com.android.support:support-compat"));
        assert!(support.matches("com.android.support:appcompat-v7"));
        assert!(!support.matches("com.android.support:multidex"));
        assert!(!support.matches("com.android.support.test:runner"));
        assert!(!support.matches("com.example:widget"));
    }

    #[test]
    fn test_builtin_firebase_exclusions() {
        let groups = builtin_lock_groups().unwrap();
        let firebase = find(&groups, "firebase");
        assert!(firebase.matches("com.google.firebase:firebase-messaging"));
        assert!(!firebase.matches("com.google.firebase:firebase-jobdispatcher"));
    }

    #[test]
    fn test_pattern_invalid_regex() {
        let err = LockGroupPattern::new("broken", "(", None).unwrap_err();
        assert!(err.to_string().contains("broken"));
        assert!(LockGroupPattern::new("broken", ".*", Some("[")).is_err());
    }

    #[test]
    fn test_load_lock_groups() {
        let path = PathBuf::from("/config/lock-groups.json");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(|_| {
                Ok(r#"[
                    {"name": "exoplayer", "include": "^com\\.google\\.android\\.exoplayer:"},
                    {"name": "kotlin", "include": "^org\\.jetbrains\\.kotlin:", "exclude": ":kotlin-reflect$"}
                ]"#
                .to_string())
            });

        let groups = load_lock_groups(&runtime, &path).unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups[0].matches("com.google.android.exoplayer:exoplayer-core"));
        assert!(groups[1].matches("org.jetbrains.kotlin:kotlin-stdlib"));
        assert!(!groups[1].matches("org.jetbrains.kotlin:kotlin-reflect"));
    }

    #[test]
    fn test_load_lock_groups_invalid_json() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_read_to_string()
            .returning(|_| Ok("{not json".to_string()));

        let err = load_lock_groups(&runtime, Path::new("/bad.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
