//! Whole-file replacement for the small TOML files chatdesk keeps.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Replace `path` with `contents`, creating missing parent directories.
///
/// The bytes go to a temporary file in the same directory, which is synced
/// and then renamed over `path`, so readers see either the old file or the
/// new one.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir)?;
    }

    let mut staged = match parent {
        Some(dir) => NamedTempFile::new_in(dir)?,
        None => NamedTempFile::new()?,
    };
    staged.write_all(contents)?;
    staged.as_file_mut().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_parents_and_replaces_existing_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("settings.toml");

        write_atomically(&path, b"first = 1\n").unwrap();
        write_atomically(&path, b"second = 2\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second = 2\n");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn parent_that_is_a_file_fails_without_touching_it() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "keep").unwrap();

        let err = write_atomically(&blocker.join("settings.toml"), b"x = 1\n");
        assert!(err.is_err());
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "keep");
    }
}
