//! Capability-based filesystem helpers for the database path.

use std::io;
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Create the directory that will hold `path`, if it is missing.
pub(crate) fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base_dir, relative) = split_ambient_base(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Split `parent` into an ambient directory to open and the part below it.
fn split_ambient_base(parent: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let (base, relative) = match parent.as_std_path().components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = parent
                .strip_prefix(&base)
                .or_else(|_| parent.strip_prefix(prefix))
                .map_err(|_| io::Error::other("failed to strip prefix from parent path"))?;
            (base, relative.to_path_buf())
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = parent
                .strip_prefix(&base)
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?;
            (base, relative.to_path_buf())
        }
        _ => (Utf8PathBuf::from("."), parent.to_path_buf()),
    };

    let dir = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((dir, relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    fn creates_nested_parents() {
        let tmp = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
        let database = root.join("data/agency/transit.db");

        ensure_parent_dir(&database).expect("create parents");
        assert!(root.join("data/agency").is_dir());
        assert!(!database.exists());
    }

    #[rstest]
    #[case::bare_file_name("transit.db")]
    #[case::root_file("/transit.db")]
    fn bare_paths_need_no_directory(#[case] path: &str) {
        ensure_parent_dir(Utf8Path::new(path)).expect("nothing to create");
    }
}
