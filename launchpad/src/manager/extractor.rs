//! Archive extraction for payload installation.
//!
//! This module handles:
//! - Reading archive entries in order through the zip central directory
//! - Materializing directories and files under the install directory
//! - Counting new vs. updated files
//!
//! Extraction favors partial progress over atomicity: an entry that fails to
//! create or copy is logged, counted and skipped. Only a container that
//! cannot be parsed aborts the whole extraction.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use super::error::{ManagerError, ManagerResult};

/// Buffer size for copying entry contents to disk (512KB).
pub const COPY_BUFFER_SIZE: usize = 512 * 1024;

/// One record inside an archive.
pub enum ArchiveEntry<'a> {
    /// Directory marker.
    Directory { name: String },
    /// Regular file with its contents.
    File {
        name: String,
        data: Box<dyn Read + 'a>,
    },
}

impl ArchiveEntry<'_> {
    /// Entry name relative to the archive root.
    pub fn name(&self) -> &str {
        match self {
            Self::Directory { name } | Self::File { name, .. } => name,
        }
    }
}

/// Lazy, in-order sequence of archive entries.
///
/// Each entry borrows the source, so at most one entry is alive at a time.
pub trait EntrySource {
    /// Advance to the next entry.
    ///
    /// Returns `Ok(None)` at the end of the archive and
    /// [`ManagerError::ArchiveCorrupt`] when the container cannot be parsed.
    fn next_entry(&mut self) -> ManagerResult<Option<ArchiveEntry<'_>>>;
}

/// Zip archive entries in archive order.
///
/// Entries are located through the central directory, so archives whose
/// local headers defer sizes to a trailing data descriptor (as written by
/// streaming zip writers) are read like any other.
pub struct ZipEntries<R: Read + Seek> {
    archive: ZipArchive<R>,
    position: usize,
}

impl<R: Read + Seek> ZipEntries<R> {
    /// Open the archive, reading its central directory.
    ///
    /// Returns [`ManagerError::ArchiveCorrupt`] if no valid central
    /// directory is found.
    pub fn new(reader: R) -> ManagerResult<Self> {
        let archive = ZipArchive::new(reader).map_err(|e| ManagerError::ArchiveCorrupt {
            reason: e.to_string(),
        })?;
        Ok(Self {
            archive,
            position: 0,
        })
    }

    /// Number of entries in the central directory.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Whether the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }
}

impl<R: Read + Seek> EntrySource for ZipEntries<R> {
    fn next_entry(&mut self) -> ManagerResult<Option<ArchiveEntry<'_>>> {
        if self.position >= self.archive.len() {
            return Ok(None);
        }

        let index = self.position;
        self.position += 1;
        let file = self
            .archive
            .by_index(index)
            .map_err(|e| ManagerError::ArchiveCorrupt {
                reason: format!("entry {}: {}", index, e),
            })?;

        let name = file.name().to_string();
        if file.is_dir() {
            Ok(Some(ArchiveEntry::Directory { name }))
        } else {
            Ok(Some(ArchiveEntry::File {
                name,
                data: Box::new(file),
            }))
        }
    }
}

/// Counts produced by an extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Files that did not exist before.
    pub new_files: usize,
    /// Files that replaced an existing file.
    pub updated_files: usize,
    /// File entries skipped because they could not be created or copied.
    pub failed_entries: usize,
    /// Entries refused because their path would leave the install directory.
    pub skipped_entries: usize,
}

impl InstallReport {
    /// Number of files written successfully.
    pub fn total_files(&self) -> usize {
        self.new_files + self.updated_files
    }

    /// Whether every entry was installed.
    pub fn is_complete(&self) -> bool {
        self.failed_entries == 0 && self.skipped_entries == 0
    }
}

/// Whether a file entry created or replaced its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileStatus {
    New,
    Updated,
}

/// Extract every entry of `source` into `output_dir`.
///
/// # Errors
///
/// Returns [`ManagerError::ArchiveCorrupt`] if the archive cannot be parsed.
/// Entry-level failures never produce an error; they are reflected
/// in [`InstallReport::failed_entries`].
pub fn install_entries<S>(source: &mut S, output_dir: &Path) -> ManagerResult<InstallReport>
where
    S: EntrySource + ?Sized,
{
    let mut report = InstallReport::default();

    while let Some(entry) = source.next_entry()? {
        let Some(target) = resolve_entry_path(output_dir, entry.name()) else {
            warn!(entry = entry.name(), "Refusing archive entry outside install directory");
            report.skipped_entries += 1;
            continue;
        };

        match entry {
            ArchiveEntry::Directory { .. } => {
                if let Err(e) = ensure_dir(&target) {
                    warn!(error = %e, "Failed to create folder");
                }
            }
            ArchiveEntry::File { mut data, .. } => match write_entry(&target, data.as_mut()) {
                Ok(FileStatus::New) => report.new_files += 1,
                Ok(FileStatus::Updated) => report.updated_files += 1,
                Err(e) => {
                    warn!(error = %e, "Skipping archive entry");
                    report.failed_entries += 1;
                }
            },
        }
    }

    info!(
        updated = report.updated_files,
        new = report.new_files,
        failed = report.failed_entries,
        skipped = report.skipped_entries,
        "Assets extracted"
    );

    Ok(report)
}

/// Extract a seekable zip archive into `output_dir`.
pub fn install_zip<R: Read + Seek>(reader: R, output_dir: &Path) -> ManagerResult<InstallReport> {
    let mut entries = ZipEntries::new(reader)?;
    debug!(entries = entries.len(), "Archive opened");
    install_entries(&mut entries, output_dir)
}

/// Extract a zip archive read from `reader` into `output_dir`.
///
/// The central directory sits at the end of the archive, so the whole
/// stream is buffered in memory first.
pub fn install_archive<R: Read>(mut reader: R, output_dir: &Path) -> ManagerResult<InstallReport> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| ManagerError::ArchiveRead { source: e })?;
    install_zip(Cursor::new(bytes), output_dir)
}

/// Extract the zip archive at `archive_path` into `output_dir`.
pub fn install_archive_file(archive_path: &Path, output_dir: &Path) -> ManagerResult<InstallReport> {
    let file = File::open(archive_path).map_err(|e| ManagerError::ReadFailed {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    debug!(archive = %archive_path.display(), "Uncompressing archive");
    install_zip(BufReader::new(file), output_dir)
}

/// Join an entry name onto `output_dir`, refusing names that could escape it.
pub(super) fn resolve_entry_path(output_dir: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let contained = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    contained.then(|| output_dir.join(relative))
}

/// Create a directory tree on demand.
fn ensure_dir(path: &Path) -> ManagerResult<()> {
    if path.is_dir() {
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| ManagerError::CreateDirFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write one file entry, creating parent directories as needed.
fn write_entry(target: &Path, data: &mut dyn Read) -> ManagerResult<FileStatus> {
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }

    let entry_err = |e: io::Error| ManagerError::EntryIo {
        path: target.to_path_buf(),
        source: e,
    };

    let (file, status) = if target.exists() {
        (File::create(target).map_err(entry_err)?, FileStatus::Updated)
    } else {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .map_err(entry_err)?;
        (file, FileStatus::New)
    };

    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, file);
    io::copy(data, &mut writer).map_err(entry_err)?;
    writer.flush().map_err(entry_err)?;

    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// In-memory entry source for exercising extraction without a zip archive.
    struct VecSource {
        entries: Vec<(String, Option<String>)>,
        corrupt_after: Option<usize>,
        position: usize,
    }

    impl VecSource {
        fn new(entries: &[(&str, Option<&str>)]) -> Self {
            Self {
                entries: entries
                    .iter()
                    .map(|(name, data)| (name.to_string(), data.map(str::to_string)))
                    .collect(),
                corrupt_after: None,
                position: 0,
            }
        }

        fn corrupt_after(mut self, count: usize) -> Self {
            self.corrupt_after = Some(count);
            self
        }
    }

    impl EntrySource for VecSource {
        fn next_entry(&mut self) -> ManagerResult<Option<ArchiveEntry<'_>>> {
            if self.corrupt_after == Some(self.position) {
                return Err(ManagerError::ArchiveCorrupt {
                    reason: "truncated header".to_string(),
                });
            }
            let Some((name, data)) = self.entries.get(self.position) else {
                return Ok(None);
            };
            self.position += 1;
            Ok(Some(match data {
                None => ArchiveEntry::Directory { name: name.clone() },
                Some(contents) => ArchiveEntry::File {
                    name: name.clone(),
                    data: Box::new(Cursor::new(contents.as_bytes())),
                },
            }))
        }
    }

    fn build_zip(entries: &[(&str, Option<&str>)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            match data {
                None => writer.add_directory(*name, options).unwrap(),
                Some(contents) => {
                    writer.start_file(*name, options).unwrap();
                    writer.write_all(contents.as_bytes()).unwrap();
                }
            }
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_resolve_entry_path() {
        let root = Path::new("/data/files");
        assert_eq!(
            resolve_entry_path(root, "module/foo.lua"),
            Some(PathBuf::from("/data/files/module/foo.lua"))
        );
        assert_eq!(
            resolve_entry_path(root, "module/sub/"),
            Some(PathBuf::from("/data/files/module/sub"))
        );
        assert!(resolve_entry_path(root, "../escape.lua").is_none());
        assert!(resolve_entry_path(root, "module/../../escape.lua").is_none());
        assert!(resolve_entry_path(root, "/etc/passwd").is_none());
    }

    #[test]
    fn test_fresh_install_counts_new_files() {
        let temp = TempDir::new().unwrap();
        let mut source = VecSource::new(&[
            ("module/", None),
            ("module/foo.lua", Some("return 1")),
            ("module/sub/bar.lua", Some("return 2")),
        ]);

        let report = install_entries(&mut source, temp.path()).unwrap();

        assert_eq!(report.new_files, 2);
        assert_eq!(report.updated_files, 0);
        assert!(report.is_complete());
        assert_eq!(
            fs::read_to_string(temp.path().join("module/sub/bar.lua")).unwrap(),
            "return 2"
        );
    }

    #[test]
    fn test_existing_files_count_as_updated() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("module")).unwrap();
        fs::write(temp.path().join("module/foo.lua"), "a much longer previous body").unwrap();

        let mut source = VecSource::new(&[
            ("module/foo.lua", Some("new")),
            ("module/other.lua", Some("other")),
        ]);
        let report = install_entries(&mut source, temp.path()).unwrap();

        assert_eq!(report.updated_files, 1);
        assert_eq!(report.new_files, 1);
        // Updated files are truncated, not patched in place.
        assert_eq!(
            fs::read_to_string(temp.path().join("module/foo.lua")).unwrap(),
            "new"
        );
    }

    #[test]
    fn test_directory_entry_after_nested_files() {
        let temp = TempDir::new().unwrap();
        let mut source = VecSource::new(&[
            ("deep/nested/file.txt", Some("x")),
            ("deep/", None),
            ("deep/nested/", None),
        ]);

        let report = install_entries(&mut source, temp.path()).unwrap();

        assert_eq!(report.new_files, 1);
        assert!(temp.path().join("deep/nested/file.txt").is_file());
    }

    #[test]
    fn test_failed_entry_does_not_abort() {
        let temp = TempDir::new().unwrap();
        // A directory where a file should go makes that single entry fail.
        fs::create_dir_all(temp.path().join("blocked.lua")).unwrap();

        let mut source = VecSource::new(&[
            ("first.lua", Some("1")),
            ("blocked.lua", Some("2")),
            ("last.lua", Some("3")),
        ]);
        let report = install_entries(&mut source, temp.path()).unwrap();

        assert_eq!(report.total_files(), 2);
        assert_eq!(report.failed_entries, 1);
        assert!(!report.is_complete());
        assert!(temp.path().join("last.lua").is_file());
    }

    #[test]
    fn test_directory_failure_breaks_nested_files_only() {
        let temp = TempDir::new().unwrap();
        // A regular file occupying the directory name.
        fs::write(temp.path().join("module"), "not a directory").unwrap();

        let mut source = VecSource::new(&[
            ("module/", None),
            ("module/foo.lua", Some("1")),
            ("top.lua", Some("2")),
        ]);
        let report = install_entries(&mut source, temp.path()).unwrap();

        assert_eq!(report.new_files, 1);
        assert_eq!(report.failed_entries, 1);
        assert!(temp.path().join("top.lua").is_file());
    }

    #[test]
    fn test_escaping_entries_are_skipped() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("files");
        let mut source = VecSource::new(&[
            ("../outside.lua", Some("evil")),
            ("inside.lua", Some("ok")),
        ]);

        let report = install_entries(&mut source, &output).unwrap();

        assert_eq!(report.skipped_entries, 1);
        assert_eq!(report.new_files, 1);
        assert!(!temp.path().join("outside.lua").exists());
    }

    #[test]
    fn test_corrupt_source_aborts_without_report() {
        let temp = TempDir::new().unwrap();
        let mut source =
            VecSource::new(&[("a.lua", Some("a")), ("b.lua", Some("b"))]).corrupt_after(1);

        let result = install_entries(&mut source, temp.path());
        assert!(matches!(result, Err(ManagerError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_zip_install() {
        let temp = TempDir::new().unwrap();
        let bytes = build_zip(&[
            ("module/", None),
            ("module/foo.lua", Some("print('foo')")),
            ("module/sub/bar.lua", Some("print('bar')")),
        ]);

        let report = install_archive(Cursor::new(bytes), temp.path()).unwrap();

        assert_eq!(report.new_files, 2);
        assert_eq!(report.updated_files, 0);
        assert_eq!(
            fs::read_to_string(temp.path().join("module/foo.lua")).unwrap(),
            "print('foo')"
        );
    }

    #[test]
    fn test_zip_large_entry() {
        let temp = TempDir::new().unwrap();
        let payload: Vec<u8> = (0..COPY_BUFFER_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("big.bin", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(&payload).unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        install_archive(Cursor::new(bytes), temp.path()).unwrap();

        assert_eq!(fs::read(temp.path().join("big.bin")).unwrap(), payload);
    }

    #[test]
    fn test_zip_garbage_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let result = install_archive(Cursor::new(b"definitely not a zip".to_vec()), temp.path());
        assert!(matches!(result, Err(ManagerError::ArchiveCorrupt { .. })));
    }

    #[test]
    fn test_zip_truncated_is_corrupt() {
        let temp = TempDir::new().unwrap();
        let mut bytes = build_zip(&[("module/foo.lua", Some("print('foo')"))]);
        bytes.truncate(12);

        let result = install_archive(Cursor::new(bytes), temp.path());
        assert!(matches!(result, Err(ManagerError::ArchiveCorrupt { .. })));
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in data {
            crc ^= u32::from(byte);
            for _ in 0..8 {
                let mask = (crc & 1).wrapping_neg();
                crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
            }
        }
        !crc
    }

    /// Stored archive whose local headers carry zero sizes and defer CRC and
    /// sizes to a trailing data descriptor (general-purpose flag bit 3), as
    /// streaming writers produce.
    fn data_descriptor_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        const FLAGS: u16 = 0x0008;
        const DOS_DATE: u16 = 0x0021;

        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, contents) in entries {
            let offset = out.len() as u32;
            let data = contents.as_bytes();
            let crc = crc32(data);
            let size = data.len() as u32;

            out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes());
            out.extend_from_slice(&FLAGS.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // stored
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&DOS_DATE.to_le_bytes());
            out.extend_from_slice(&[0u8; 12]); // crc and sizes deferred
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(data);

            out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());

            central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&FLAGS.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&DOS_DATE.to_le_bytes());
            central.extend_from_slice(&crc.to_le_bytes());
            central.extend_from_slice(&size.to_le_bytes());
            central.extend_from_slice(&size.to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0u8; 12]); // extra, comment, disk, attributes
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let central_offset = out.len() as u32;
        let central_size = central.len() as u32;
        out.extend_from_slice(&central);

        out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&central_size.to_le_bytes());
        out.extend_from_slice(&central_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    #[test]
    fn test_zip_with_data_descriptors() {
        let temp = TempDir::new().unwrap();
        let bytes = data_descriptor_zip(&[
            ("module/foo.lua", "print('foo')"),
            ("module/sub/bar.lua", "print('bar')"),
        ]);

        let report = install_archive(Cursor::new(bytes), temp.path()).unwrap();

        assert_eq!(report.new_files, 2);
        assert!(report.is_complete());
        assert_eq!(
            fs::read_to_string(temp.path().join("module/foo.lua")).unwrap(),
            "print('foo')"
        );
    }

    #[test]
    fn test_zip_file_with_data_descriptors() {
        let temp = TempDir::new().unwrap();
        let archive_path = temp.path().join("mybook-r1.zip");
        fs::write(&archive_path, data_descriptor_zip(&[("a.lua", "return 1")])).unwrap();
        let output = temp.path().join("files");

        let report = install_archive_file(&archive_path, &output).unwrap();

        assert_eq!(report.new_files, 1);
        assert!(output.join("a.lua").is_file());
    }

    #[test]
    fn test_empty_zip_installs_nothing() {
        let temp = TempDir::new().unwrap();
        let bytes = build_zip(&[]);

        let report = install_archive(Cursor::new(bytes), temp.path()).unwrap();

        assert_eq!(report, InstallReport::default());
    }

    #[test]
    fn test_unreadable_source_is_not_corrupt() {
        struct FailingReader;

        impl Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "device gone"))
            }
        }

        let temp = TempDir::new().unwrap();
        let result = install_archive(FailingReader, temp.path());
        assert!(matches!(result, Err(ManagerError::ArchiveRead { .. })));
    }

    #[test]
    fn test_install_archive_file_missing() {
        let temp = TempDir::new().unwrap();
        let result = install_archive_file(&temp.path().join("missing.zip"), temp.path());
        assert!(matches!(result, Err(ManagerError::ReadFailed { .. })));
    }
}
