//! File reading, text decoding, and output sinks.
//!
//! Inputs are read whole and decoded with `encoding_rs` (UTF-8 unless another
//! label is given; a leading BOM is consumed by the decoder). The `-` path
//! convention routes output to stdout.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::Path,
};

use encoding_rs::{Encoding, UTF_8};
use log::debug;
use tempfile::NamedTempFile;

use crate::error::{MergeError, Result};

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| MergeError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

pub fn decode_bytes(
    bytes: &[u8],
    encoding: &'static Encoding,
    source_name: &str,
) -> Result<String> {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(MergeError::Decode {
            source_name: source_name.to_string(),
            encoding: used.name(),
        });
    }
    Ok(text.into_owned())
}

/// Reads and decodes a whole file. The handle is closed before returning.
pub fn read_text(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path)?;
    debug!("Read {} byte(s) from {:?}", bytes.len(), path);
    decode_bytes(&bytes, encoding, &path.display().to_string())
}

/// Runs `write` against the destination and only exposes the result once it
/// succeeds. File targets go through a sibling temp file that is renamed into
/// place; `None` or `-` writes to stdout.
pub fn write_output<F>(path: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(path) if !is_dash(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            let temp = NamedTempFile::new_in(dir)?;
            {
                let mut writer = BufWriter::new(temp.as_file());
                write(&mut writer)?;
                writer.flush()?;
            }
            temp.persist(path).map_err(|err| MergeError::Io(err.error))?;
            debug!("Persisted output to {:?}", path);
            Ok(())
        }
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            write(&mut handle)?;
            handle.flush()?;
            Ok(())
        }
    }
}

/// Plain file creation for side outputs such as the JSON report.
pub fn create_file(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_bom_is_consumed_by_decoder() {
        let text = decode_bytes(b"\xEF\xBB\xBFCall Time", UTF_8, "mem").unwrap();
        assert_eq!(text, "Call Time");
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let err = decode_bytes(b"ab\xFF\xFAcd", UTF_8, "mem").unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn latin1_label_resolves() {
        let encoding = resolve_encoding(Some("latin1")).unwrap();
        let text = decode_bytes(b"r\xE9pondu", encoding, "mem").unwrap();
        assert_eq!(text, "répondu");
        assert!(resolve_encoding(Some("klingon")).is_err());
    }

    #[test]
    fn failed_write_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        let result = write_output(Some(&target), |writer| {
            writer.write_all(b"partial")?;
            Err(MergeError::parse("x", "boom"))
        });
        assert!(result.is_err());
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn successful_write_lands_at_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.csv");
        write_output(Some(&target), |writer| {
            writer.write_all(b"a;b\n")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "a;b\n");
    }
}
