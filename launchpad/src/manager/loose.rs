//! Loose-file payload installation.
//!
//! Small payloads can skip the archive and ship their files directly in the
//! bundle namespace. They are copied flat into the install directory, and the
//! payload is only usable when the entry-point file arrived with them.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Component, Path};

use tracing::{debug, warn};

use super::error::{ManagerError, ManagerResult};

/// Buffer size for loose-file copies (8KB).
const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Copy loose files into `output_dir`.
///
/// `files` yields `(name, contents)` pairs; an `Err` item stands for a file
/// that could not be opened and counts as a failed copy.
///
/// # Returns
///
/// `true` only if every file was copied and one of them is named exactly
/// `entry_point`. A failed copy stops the install and returns `false`, even
/// if the entry point was already copied.
pub fn install_loose_files<I, R>(files: I, output_dir: &Path, entry_point: &str) -> bool
where
    I: IntoIterator<Item = ManagerResult<(String, R)>>,
    R: Read,
{
    let mut entry_point_present = false;

    for item in files {
        let (name, mut data) = match item {
            Ok(file) => file,
            Err(e) => {
                warn!(error = %e, "Error with raw assets");
                return false;
            }
        };

        if let Err(e) = copy_file(&name, &mut data, output_dir) {
            warn!(error = %e, "Error with raw assets");
            return false;
        }

        if name == entry_point {
            entry_point_present = true;
        }
    }

    if !entry_point_present {
        warn!(entry_point, "Loose-file payload has no entry point");
    }
    entry_point_present
}

/// Copy one loose file to `output_dir/name`, replacing any existing file.
fn copy_file(name: &str, data: &mut dyn Read, output_dir: &Path) -> ManagerResult<()> {
    let mut components = Path::new(name).components();
    let flat = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !flat {
        return Err(ManagerError::InvalidPath(format!(
            "loose file name must be a plain file name: {}",
            name
        )));
    }

    let target = output_dir.join(name);
    let entry_err = |e: io::Error| ManagerError::EntryIo {
        path: target.clone(),
        source: e,
    };

    debug!(name, target = %target.display(), "Copying loose file");
    let file = File::create(&target).map_err(entry_err)?;
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    io::copy(data, &mut writer).map_err(entry_err)?;
    writer.flush().map_err(entry_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn files<'a>(
        entries: &'a [(&'a str, &'a str)],
    ) -> impl Iterator<Item = ManagerResult<(String, Cursor<&'a [u8]>)>> + 'a {
        entries
            .iter()
            .map(|(name, contents)| Ok((name.to_string(), Cursor::new(contents.as_bytes()))))
    }

    #[test]
    fn test_entry_point_present() {
        let temp = TempDir::new().unwrap();
        let entries = [("llapp_main.lua", "print('hi')"), ("util.lua", "return {}")];

        assert!(install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
        assert_eq!(
            fs::read_to_string(temp.path().join("llapp_main.lua")).unwrap(),
            "print('hi')"
        );
        assert!(temp.path().join("util.lua").is_file());
    }

    #[test]
    fn test_entry_point_missing() {
        let temp = TempDir::new().unwrap();
        let entries = [("main.lua", "x"), ("util.lua", "y")];

        assert!(!install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
        // Everything else was still copied.
        assert!(temp.path().join("main.lua").is_file());
        assert!(temp.path().join("util.lua").is_file());
    }

    #[test]
    fn test_entry_point_is_case_sensitive() {
        let temp = TempDir::new().unwrap();
        let entries = [("LLAPP_MAIN.lua", "x")];

        assert!(!install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
    }

    #[test]
    fn test_failed_copy_after_entry_point() {
        let temp = TempDir::new().unwrap();
        // A directory in the way of the second file.
        fs::create_dir(temp.path().join("blocked.lua")).unwrap();
        let entries = [("llapp_main.lua", "x"), ("blocked.lua", "y")];

        assert!(!install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
        assert!(temp.path().join("llapp_main.lua").is_file());
    }

    #[test]
    fn test_unopenable_file_fails_install() {
        let temp = TempDir::new().unwrap();
        let items: Vec<ManagerResult<(String, Cursor<&[u8]>)>> = vec![
            Ok(("llapp_main.lua".to_string(), Cursor::new(b"x".as_slice()))),
            Err(ManagerError::InvalidPath("unreadable".to_string())),
        ];

        assert!(!install_loose_files(items, temp.path(), "llapp_main.lua"));
    }

    #[test]
    fn test_nested_name_fails_install() {
        let temp = TempDir::new().unwrap();
        let entries = [("llapp_main.lua", "x"), ("sub/file.lua", "y")];

        assert!(!install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
        assert!(!temp.path().join("sub").exists());
    }

    #[test]
    fn test_existing_files_are_replaced() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("llapp_main.lua"), "old and longer").unwrap();
        let entries = [("llapp_main.lua", "new")];

        assert!(install_loose_files(
            files(&entries),
            temp.path(),
            "llapp_main.lua"
        ));
        assert_eq!(
            fs::read_to_string(temp.path().join("llapp_main.lua")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_empty_set_has_no_entry_point() {
        let temp = TempDir::new().unwrap();
        assert!(!install_loose_files(files(&[]), temp.path(), "llapp_main.lua"));
    }
}
