//! Classification of the requested packages after the copy step.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Write;
use std::path::Path;

use crate::fallback::Request;
use crate::lock::ModificationRecord;
use crate::package::{Coordinate, versionless_name_from_file};

/// What happened to each requested package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    /// File names written to the destination
    pub copied: Vec<String>,
    /// Requested specifiers, as given, that produced no file
    pub missing: Vec<String>,
    /// Version overrides applied by lock groups
    pub modified: Vec<ModificationRecord>,
}

impl ResolutionReport {
    /// Classify `requests` against the file names actually written.
    ///
    /// `copied` must be the post-rename destination names, so a request
    /// satisfied through `srcaar` is matched by its `.aar` file.
    pub fn build(
        requests: &[Request],
        copied: Vec<String>,
        modified: Vec<ModificationRecord>,
    ) -> Self {
        let produced: HashSet<String> = copied
            .iter()
            .filter_map(|name| versionless_name_from_file(Path::new(name)))
            .collect();

        let missing = requests
            .iter()
            .filter(|r| {
                Coordinate::parse(&r.effective).is_some_and(|c| !produced.contains(&c.artifact))
            })
            .map(|r| r.original.clone())
            .collect();

        Self {
            copied,
            missing,
            modified,
        }
    }

    /// True when every request produced a file.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Human-readable report: copied, then missing, then modified.
    /// Empty sections are left out.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if !self.copied.is_empty() {
            section(&mut out, "Copied artifacts", self.copied.iter());
        }
        if !self.missing.is_empty() {
            section(&mut out, "Missing artifacts", self.missing.iter());
        }
        if !self.modified.is_empty() {
            section(&mut out, "Modified artifacts", self.modified.iter());
        }
        out
    }
}

fn section<T: std::fmt::Display>(out: &mut String, title: &str, items: impl Iterator<Item = T>) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}:", title);
    for item in items {
        let _ = writeln!(out, "  {}", item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(original: &str, effective: &str) -> Request {
        Request {
            original: original.to_string(),
            effective: effective.to_string(),
        }
    }

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_classifies_missing() {
        let requests = vec![
            request("com.example:widget:1.0", "com.example:widget:1.0"),
            request("com.example:ghost:9.9.9", "com.example:ghost:9.9.9@srcaar"),
        ];
        let report = ResolutionReport::build(&requests, names(&["widget-1.0.aar"]), vec![]);

        assert_eq!(report.copied, vec!["widget-1.0.aar"]);
        assert_eq!(report.missing, vec!["com.example:ghost:9.9.9"]);
        assert!(!report.is_complete());
    }

    #[test]
    fn test_build_matches_widened_request_by_renamed_file() {
        let requests = vec![request(
            "com.example:gadget:2.0",
            "com.example:gadget:2.0@srcaar",
        )];
        let report = ResolutionReport::build(&requests, names(&["gadget-2.0.aar"]), vec![]);
        assert!(report.is_complete());
    }

    #[test]
    fn test_build_ignores_malformed_requests() {
        let requests = vec![request("com.google.android.gms", "com.google.android.gms")];
        let report = ResolutionReport::build(&requests, vec![], vec![]);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_build_version_change_is_not_missing() {
        let requests = vec![request(
            "com.android.support:support-compat:26.0.0",
            "com.android.support:support-compat:26.0.0",
        )];
        let modified = vec![ModificationRecord {
            original: "com.android.support:support-compat:26.0.0@aar".into(),
            modified: "com.android.support:support-compat:26.0.1@aar".into(),
        }];
        let report = ResolutionReport::build(
            &requests,
            names(&["support-compat-26.0.1.aar"]),
            modified.clone(),
        );

        assert!(report.is_complete());
        assert_eq!(report.modified, modified);
    }

    #[test]
    fn test_render_text_section_order() {
        let report = ResolutionReport {
            copied: names(&["widget-1.0.aar"]),
            missing: names(&["com.example:ghost:9.9.9"]),
            modified: vec![ModificationRecord {
                original: "com.example:a:1.0@aar".into(),
                modified: "com.example:a:1.2@aar".into(),
            }],
        };

        let text = report.render_text();
        assert_eq!(
            text,
            "Copied artifacts:\n  widget-1.0.aar\n\n\
             Missing artifacts:\n  com.example:ghost:9.9.9\n\n\
             Modified artifacts:\n  com.example:a:1.0@aar --> com.example:a:1.2@aar\n"
        );
    }

    #[test]
    fn test_render_text_skips_empty_sections() {
        let report = ResolutionReport {
            copied: names(&["widget-1.0.aar"]),
            ..Default::default()
        };
        assert_eq!(report.render_text(), "Copied artifacts:\n  widget-1.0.aar\n");
        assert_eq!(ResolutionReport::default().render_text(), "");
    }

    #[test]
    fn test_report_json() {
        let report = ResolutionReport {
            copied: names(&["widget-1.0.aar"]),
            missing: vec![],
            modified: vec![ModificationRecord {
                original: "com.example:a:1.0@aar".into(),
                modified: "com.example:a:1.2@aar".into(),
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["copied"][0], "widget-1.0.aar");
        assert_eq!(json["modified"][0]["original"], "com.example:a:1.0@aar");
        assert_eq!(json["modified"][0]["modified"], "com.example:a:1.2@aar");
    }
}
