//! Test helpers writing agency feeds to a temporary workspace.

use camino::Utf8PathBuf;
use std::fs;
use tempfile::TempDir;

use crate::load::LoadConfig;

pub(super) const STOPS_FEED: &str = r#"{
    "stops": [
        {"id": 4235106, "name": "Alderman Rd @ Gilmer Hall", "position": [38.0340, -78.5134]},
        {"id": 4235108, "name": "Whitehead Rd @ Rice Hall", "position": [38.0316, -78.5108]},
        {"id": 4235112, "name": "University Ave @ Rotunda", "position": [38.0356, -78.5034]}
    ],
    "routes": [
        {"id": 4013, "stops": [4235106, 4235108, 4235112]},
        {"id": 4015, "stops": [4235112, 4235106]}
    ]
}"#;

pub(super) const LINES_FEED: &str = r#"{
    "lines": [
        {"id": 4013, "is_active": true, "long_name": "Inner U-Loop", "short_name": "IUL"},
        {"id": 4015, "is_active": false, "long_name": "Northline", "short_name": "NL"}
    ]
}"#;

pub(super) const GILMER: u32 = 4235106;
pub(super) const RICE: u32 = 4235108;
pub(super) const ROTUNDA: u32 = 4235112;

#[derive(Debug)]
pub(super) struct FeedFiles {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl FeedFiles {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        fs::write(root.join("stops.json"), STOPS_FEED).expect("write stops feed");
        fs::write(root.join("lines.json"), LINES_FEED).expect("write lines feed");
        Self { _dir: dir, root }
    }

    pub(super) fn stops(&self) -> Utf8PathBuf {
        self.root.join("stops.json")
    }

    pub(super) fn lines(&self) -> Utf8PathBuf {
        self.root.join("lines.json")
    }

    /// Database path whose parent directory does not exist yet.
    pub(super) fn database(&self) -> Utf8PathBuf {
        self.root.join("state/transit.db")
    }

    pub(super) fn load_config(&self) -> LoadConfig {
        LoadConfig {
            database: self.database(),
            stops_feed: transit_data::FeedLocation::File(self.stops()),
            lines_feed: transit_data::FeedLocation::File(self.lines()),
        }
    }
}

pub(super) fn json_output(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).expect("command output should be JSON")
}
