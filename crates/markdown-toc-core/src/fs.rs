use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::Builder;

/// Replace `path` with `contents` so readers never observe a partial file.
///
/// The data goes to a temporary sibling first and is renamed over the target.
/// The temporary file is removed if any step fails. A symlink is followed so
/// the file it points at is replaced and the link survives. The target's
/// directory must be writable.
pub fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let path = resolve_target(path)?;
    let path = path.as_path();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = Builder::new().prefix(".markdown-toc").tempfile_in(parent)?;
    tmp.as_file_mut().write_all(contents.as_bytes())?;
    tmp.as_file_mut().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode();
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(mode))?;
        }
    }

    tmp.persist(path).map(|_| ()).map_err(|err| err.error)
}

fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    match fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_contents_without_leftovers() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("doc.md");
        fs::write(&file_path, "hello").unwrap();

        write_atomic(&file_path, "updated").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "updated");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("doc.md");
        fs::write(&file_path, "hello").unwrap();
        fs::set_permissions(&file_path, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&file_path, "updated").unwrap();

        let mode = fs::metadata(&file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn writes_through_symlinks() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("real.md");
        let link = dir.path().join("link.md");
        fs::write(&target, "hello").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        write_atomic(&link, "updated").unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&target).unwrap(), "updated");
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("doc.md");
        assert!(write_atomic(&file_path, "updated").is_err());
        assert!(!file_path.exists());
    }
}
