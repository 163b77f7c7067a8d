use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extracts every entry of `archive` below `dest`, replacing existing files.
/// Returns the paths of the extracted files.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let f = File::open(archive).with_context(|| format!("failed to open {}", archive.display()))?;
    let mut zip = ZipArchive::new(BufReader::new(f))
        .with_context(|| format!("{} is not a zip archive", archive.display()))?;
    std::fs::create_dir_all(dest)?;
    let mut files = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let path = match entry.enclosed_name() {
            Some(name) => dest.join(name),
            None => {
                tracing::warn!("skipping entry {} outside of {}", entry.name(), dest.display());
                continue;
            }
        };
        if entry.is_dir() {
            std::fs::create_dir_all(&path)?;
            continue;
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(path = %path.display(), size = entry.size(), "extracting");
        let mut out =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        std::io::copy(&mut entry, &mut out)?;
        apply_mode(&path, entry.unix_mode())?;
        files.push(path);
    }
    tracing::info!(archive = %archive.display(), files = files.len(), "extracted");
    Ok(files)
}

/// Applies the stored mode, keeping the file writable by its owner so the
/// next extraction can replace it.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: Option<u32>) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    if let Some(mode) = mode {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode | 0o200))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_mode(_path: &Path, _mode: Option<u32>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) -> Result<()> {
        let mut zip = ZipWriter::new(File::create(path)?);
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options)?;
            } else {
                zip.start_file(*name, options)?;
                zip.write_all(data)?;
            }
        }
        zip.finish()?;
        Ok(())
    }

    #[test]
    fn reproduces_archive_contents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        let blob: Vec<u8> = (0..10_000u32).map(|i| (i * 7) as u8).collect();
        let entries: Vec<(&str, &[u8])> = vec![
            ("Altseed2.dll", &blob[..]),
            ("runtimes/", &b""[..]),
            ("runtimes/linux-x64/native/libAltseed2.so", &b"\x7fELF"[..]),
            ("README.md", &b"hello\n"[..]),
        ];
        write_zip(&archive, &entries)?;
        let lib = dir.path().join("lib");
        let files = extract_zip(&archive, &lib)?;
        assert_eq!(files.len(), 3);
        for (name, data) in entries.iter().filter(|(n, _)| !n.ends_with('/')) {
            assert_eq!(std::fs::read(lib.join(name))?, *data);
        }
        assert!(lib.join("runtimes").is_dir());
        Ok(())
    }

    #[test]
    fn overwrites_existing_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("a.txt", &b"new"[..])])?;
        std::fs::write(dir.path().join("a.txt"), b"old contents")?;
        std::fs::write(dir.path().join("keep.txt"), b"untouched")?;
        extract_zip(&archive, dir.path())?;
        assert_eq!(std::fs::read(dir.path().join("a.txt"))?, b"new");
        assert_eq!(std::fs::read(dir.path().join("keep.txt"))?, b"untouched");
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn read_only_entries_can_be_extracted_again() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        let mut zip = ZipWriter::new(File::create(&archive)?);
        zip.start_file("ro.dll", FileOptions::default().unix_permissions(0o444))?;
        zip.write_all(b"v1")?;
        zip.finish()?;
        let lib = dir.path().join("lib");
        extract_zip(&archive, &lib)?;
        extract_zip(&archive, &lib)?;
        let mode = std::fs::metadata(lib.join("ro.dll"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
        assert_eq!(std::fs::read(lib.join("ro.dll"))?, b"v1");
        Ok(())
    }

    #[test]
    fn skips_entries_escaping_dest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        write_zip(&archive, &[("../evil.txt", &b"x"[..]), ("ok.txt", &b"y"[..])])?;
        let lib = dir.path().join("lib");
        let files = extract_zip(&archive, &lib)?;
        assert_eq!(files, vec![lib.join("ok.txt")]);
        assert!(!dir.path().join("evil.txt").exists());
        Ok(())
    }

    #[test]
    fn rejects_non_zip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let archive = dir.path().join("a.zip");
        std::fs::write(&archive, b"{\"message\": \"Bad credentials\"}")?;
        assert!(extract_zip(&archive, dir.path()).is_err());
        Ok(())
    }
}
