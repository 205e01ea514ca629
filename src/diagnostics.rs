//! Offline-debugging artifacts for photos that fail to decode.
//!
//! The pipeline never writes anything. When a record comes back as
//! `decode-error`, the batch driver may call [`dump_undecodable`] to keep the
//! exact bytes the collaborator returned, under a name derived from the
//! record identifier:
//!
//! ```text
//! failed-photos/
//! └── failed_photo_<id>.bin
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// How many leading bytes [`hex_preview`] shows.
pub const PREVIEW_LEN: usize = 16;

/// Artifact file name for a record identifier.
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so an identifier
/// can never escape the dump directory.
pub fn artifact_filename(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("failed_photo_{safe}.bin")
}

/// Write undecodable bytes to `<dir>/failed_photo_<id>.bin`.
///
/// Creates `dir` if needed and returns the written path.
pub fn dump_undecodable(dir: &Path, id: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(artifact_filename(id));
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Space-separated hex of the first [`PREVIEW_LEN`] bytes.
///
/// Enough to tell an HTML error page (`3c 21 44 4f`) from a truncated JPEG
/// (`ff d8 ff e0`) in a log line.
pub fn hex_preview(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take(PREVIEW_LEN)
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn artifact_filename_plain_id() {
        assert_eq!(artifact_filename("S1234"), "failed_photo_S1234.bin");
    }

    #[test]
    fn artifact_filename_sanitizes_path_separators() {
        assert_eq!(
            artifact_filename("../etc/passwd"),
            "failed_photo_.._etc_passwd.bin"
        );
        assert_eq!(artifact_filename("a b\\c"), "failed_photo_a_b_c.bin");
    }

    #[test]
    fn dump_writes_exact_bytes() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("failed");

        let path = dump_undecodable(&dir, "S42", b"\x00\x01garbage").unwrap();

        assert_eq!(path, dir.join("failed_photo_S42.bin"));
        assert_eq!(fs::read(&path).unwrap(), b"\x00\x01garbage");
    }

    #[test]
    fn dump_overwrites_previous_artifact() {
        let tmp = TempDir::new().unwrap();
        dump_undecodable(tmp.path(), "S1", b"first").unwrap();
        let path = dump_undecodable(tmp.path(), "S1", b"second").unwrap();
        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn hex_preview_truncates() {
        let bytes: Vec<u8> = (0u8..40).collect();
        let preview = hex_preview(&bytes);
        assert_eq!(preview.split(' ').count(), PREVIEW_LEN);
        assert!(preview.starts_with("00 01 02"));
        assert!(preview.ends_with("0f"));
    }

    #[test]
    fn hex_preview_short_and_empty() {
        assert_eq!(hex_preview(b"<!DO"), "3c 21 44 4f");
        assert_eq!(hex_preview(&[]), "");
    }
}
