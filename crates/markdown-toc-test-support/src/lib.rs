//! Shared test harness utilities for markdown-toc crates.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use markdown_toc_config::TocSettings;
use tempfile::TempDir;

/// Baseline settings for tests: the built-in defaults with a tight list.
pub fn tight_settings() -> TocSettings {
    TocSettings {
        tight: true,
        ..TocSettings::default()
    }
}

/// Write `contents` to `relative` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}

/// Temporary directory holding a single `doc.md` with `contents`.
pub fn fixture(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    let path = write_file(dir.path(), "doc.md", contents);
    (dir, path)
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read file")
}
