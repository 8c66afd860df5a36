#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const NEW_DATA_HEADER: &str = "\u{feff}Call Time,From,To,Direction,Status,Ringing,Talking";

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Returns a path under the workspace without creating it.
    pub fn file(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.file(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.file(name)).expect("read workspace file")
    }
}

/// A call-log export the way the phone system emits it: BOM header, one line
/// wrapped in an extra quote pair, a blank line, and a `Totals` trailer.
pub fn sample_export() -> String {
    [
        NEW_DATA_HEADER,
        "2024-03-05 14:05:10,0102030405,0607080910,Inbound,Answered,00:05,02:30",
        r#""2024-03-05 09:15:00,0111111111,0622222222,Inbound,Unanswered,00:20,""No answer, caller hung up""""#,
        "",
        "2024-03-05 23:59:59,0133333333,0644444444,Outbound,Answered,00:02,01:05:00",
        "Totals,,,,,00:27,01:07:30",
    ]
    .join("\n")
}

pub fn sample_primary() -> String {
    "Date;Appelant;Destination;Conversation;ID;Heure;Répondu;Durée;Mois\n\
     04/03/2024 08:00:00;0100000000;0600000000;00:45;04/03/2024 08:00:000100000000;08h  - 09h;répondu;45;2024-03\n"
        .to_string()
}
