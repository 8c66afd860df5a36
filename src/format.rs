//! Derived business columns computed from a validated call.
//!
//! Each [`RawCallRecord`] maps to exactly one [`FormattedCallRecord`]. No
//! column computation can fail: an unreadable talk time degrades `Durée` to
//! [`DURATION_SENTINEL`].

use std::sync::LazyLock;

use chrono::Timelike;
use regex::Regex;

use crate::{dataset::Record, validate::RawCallRecord};

pub const FORMATTED_COLUMNS: [&str; 9] = [
    "Date",
    "Appelant",
    "Destination",
    "Conversation",
    "ID",
    "Heure",
    "Répondu",
    "Durée",
    "Mois",
];

pub const UNANSWERED_STATUS: &str = "Unanswered";
pub const NOT_ANSWERED: &str = "non répondu";
pub const ANSWERED: &str = "répondu";

/// Stands in for a duration that could not be read. Indistinguishable from a
/// real 10000 second call.
pub const DURATION_SENTINEL: u64 = 10_000;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d+):(\d+)(?:\.\d+)?$").expect("valid duration pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCallRecord {
    pub date: String,
    pub appelant: String,
    pub destination: String,
    pub conversation: String,
    pub id: String,
    pub heure: String,
    pub repondu: String,
    pub duree: u64,
    pub mois: String,
}

impl FormattedCallRecord {
    pub fn from_raw(raw: &RawCallRecord) -> Self {
        let date = raw.call_time.format("%d/%m/%Y %H:%M:%S").to_string();
        let conversation = if raw.status == UNANSWERED_STATUS {
            NOT_ANSWERED.to_string()
        } else {
            raw.talking.clone()
        };
        let repondu = if conversation == NOT_ANSWERED {
            NOT_ANSWERED
        } else {
            ANSWERED
        };
        let duree = parse_duration_seconds(&conversation).unwrap_or(DURATION_SENTINEL);
        FormattedCallRecord {
            id: format!("{date}{}", raw.from),
            heure: hour_bucket(raw.call_time.hour()),
            mois: raw.call_time.format("%Y-%m").to_string(),
            appelant: raw.from.clone(),
            destination: raw.to.clone(),
            repondu: repondu.to_string(),
            date,
            conversation,
            duree,
        }
    }

    pub fn values(&self) -> [String; 9] {
        [
            self.date.clone(),
            self.appelant.clone(),
            self.destination.clone(),
            self.conversation.clone(),
            self.id.clone(),
            self.heure.clone(),
            self.repondu.clone(),
            self.duree.to_string(),
            self.mois.clone(),
        ]
    }

    pub fn to_record(&self) -> Record {
        Record::from_pairs(FORMATTED_COLUMNS.into_iter().zip(self.values()))
    }
}

pub fn format_calls(records: &[RawCallRecord]) -> Vec<FormattedCallRecord> {
    records.iter().map(FormattedCallRecord::from_raw).collect()
}

/// One-hour bucket label, e.g. `"14h  - 15h"`; 23 wraps to `00h`.
pub fn hour_bucket(hour: u32) -> String {
    format!("{hour:02}h  - {:02}h", (hour + 1) % 24)
}

/// Whole seconds of an `MM:SS` or `H:MM:SS` talk time.
///
/// Fractional seconds are truncated. Out-of-range seconds (or minutes, when
/// hours are present) are rejected.
pub fn parse_duration_seconds(value: &str) -> Option<u64> {
    let captures = DURATION_PATTERN.captures(value.trim())?;
    let number = |idx: usize| -> Option<u64> {
        captures
            .get(idx)
            .map(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(Some(0))
    };
    let hours = number(1)?;
    let minutes = number(2)?;
    let seconds = number(3)?;
    if seconds >= 60 || (captures.get(1).is_some() && minutes >= 60) {
        return None;
    }
    hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(seconds)
}
