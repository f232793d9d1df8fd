//! Package model
//!
//! This module provides package coordinate parsing and the numeric version
//! ordering used when reconciling package families.

mod coordinate;
mod version;

pub use coordinate::{
    Coordinate, PackageSpec, TYPE_SEPARATOR, parse_package_list, versionless_name_from_file,
};
pub use version::{
    VersionError, compare_versions, is_numeric_version, max_version, sort_versions,
};
