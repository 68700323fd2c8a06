//! Reference data loading for commands that need a ruleset

use anyhow::{Context, Result};
use skyplan::{BuildPlanner, DirectorySource, HttpSource, ReferenceRepository};
use tracing::debug;

/// Where reference documents come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    Directory(String),
    Http(String),
}

impl DataLocation {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            DataLocation::Http(location.to_string())
        } else {
            DataLocation::Directory(location.to_string())
        }
    }
}

/// Load every reference table from `location` and build a planner
pub fn open_planner(location: &str, base_url: &str) -> Result<BuildPlanner> {
    let location = DataLocation::parse(location);
    debug!(?location, "loading reference data");

    let mut planner = match &location {
        DataLocation::Directory(dir) => {
            let repository = ReferenceRepository::new(DirectorySource::new(dir));
            BuildPlanner::from_repository(&repository)
                .with_context(|| format!("Failed to load reference data from {}", dir))?
        }
        DataLocation::Http(url) => {
            let repository = ReferenceRepository::new(HttpSource::new(url.as_str()));
            BuildPlanner::from_repository(&repository)
                .with_context(|| format!("Failed to fetch reference data from {}", url))?
        }
    };
    planner.set_base_url(base_url);
    Ok(planner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share_data() -> String {
        format!("{}/../../share/data", env!("CARGO_MANIFEST_DIR"))
    }

    #[test]
    fn test_parse_location() {
        assert_eq!(
            DataLocation::parse("https://data.example/"),
            DataLocation::Http("https://data.example/".to_string())
        );
        assert_eq!(
            DataLocation::parse("share/data"),
            DataLocation::Directory("share/data".to_string())
        );
    }

    #[test]
    fn test_open_planner_from_directory() {
        let planner = open_planner(&share_data(), "http://localhost/").unwrap();
        assert_eq!(planner.base_url(), "http://localhost/");
        assert!(planner.data().perk_list_by_name("LoreRim v3.0.4").is_some());
    }

    #[test]
    fn test_open_planner_missing_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = open_planner(dir.path().to_str().unwrap(), "http://localhost/").unwrap_err();
        assert!(err.to_string().contains("Failed to load reference data"));
    }
}
