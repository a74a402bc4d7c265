//! Core data types for the notes API.
//!
//! A note is a short named text document. Its identifier is a compact
//! 12-byte value laid out like a classic document-store object id:
//!
//! - bytes `0..4`: big-endian Unix seconds at creation
//! - bytes `4..9`: random value chosen once per process
//! - bytes `9..12`: big-endian counter, seeded randomly
//!
//! On the wire the id is always 24 lowercase hex characters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

// ============================================================================
// ID Types
// ============================================================================

/// Number of raw bytes in a `NoteId`.
pub const NOTE_ID_LEN: usize = 12;

/// Number of hex characters in the textual form of a `NoteId`.
pub const NOTE_ID_HEX_LEN: usize = NOTE_ID_LEN * 2;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: OnceLock<[u8; 5]> = OnceLock::new();
static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

/// Unique identifier for a note.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub [u8; NOTE_ID_LEN]);

impl NoteId {
    /// Generates a fresh identifier with the current time as prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Generates a fresh identifier whose timestamp prefix is `time`.
    #[must_use]
    pub fn at(time: DateTime<Utc>) -> Self {
        let mut bytes = [0u8; NOTE_ID_LEN];

        // Truncation past 2106 matches the reference id format.
        let seconds = time.timestamp() as u32;
        bytes[0..4].copy_from_slice(&seconds.to_be_bytes());

        let process = PROCESS_UNIQUE.get_or_init(rand::random);
        bytes[4..9].copy_from_slice(process);

        let counter = COUNTER
            .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
            .fetch_add(1, Ordering::Relaxed)
            & COUNTER_MASK;
        bytes[9..12].copy_from_slice(&counter.to_be_bytes()[1..4]);

        Self(bytes)
    }

    /// Creates a NoteId from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; NOTE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the inner bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; NOTE_ID_LEN] {
        &self.0
    }

    /// Seconds since the Unix epoch encoded in the id prefix.
    #[must_use]
    pub fn timestamp_secs(&self) -> u32 {
        u32::from_be_bytes([self.0[0], self.0[1], self.0[2], self.0[3]])
    }

    /// Lowercase hex form, as used in JSON and URL paths.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NoteId({})", self)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for NoteId {
    type Err = NoteIdParseError;

    /// Parses 24 hex characters, either case.
    ///
    /// Characters are checked before length so that a short id with a
    /// non-hex character reports the offending byte.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = hex::decode(s).map_err(|e| match e {
            hex::FromHexError::InvalidHexCharacter { c, index } => NoteIdParseError::InvalidByte {
                byte: c,
                position: index,
            },
            hex::FromHexError::OddLength => NoteIdParseError::OddLength,
            hex::FromHexError::InvalidStringLength => NoteIdParseError::InvalidLength(s.len()),
        })?;

        let bytes: [u8; NOTE_ID_LEN] = decoded
            .try_into()
            .map_err(|_| NoteIdParseError::InvalidLength(s.len()))?;
        Ok(Self(bytes))
    }
}

/// Error type for parsing a NoteId from string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteIdParseError {
    /// A character outside `[0-9a-fA-F]`.
    InvalidByte { byte: char, position: usize },
    /// The string had an odd number of characters.
    OddLength,
    /// The string decoded to something other than 12 bytes.
    InvalidLength(usize),
}

impl fmt::Display for NoteIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidByte { byte, position } => {
                write!(
                    f,
                    "invalid byte {:?} at position {} in note ID",
                    byte, position
                )
            }
            Self::OddLength => write!(f, "odd number of hex digits in note ID"),
            Self::InvalidLength(len) => write!(
                f,
                "note ID must be {} hex characters, got {}",
                NOTE_ID_HEX_LEN, len
            ),
        }
    }
}

impl std::error::Error for NoteIdParseError {}

impl Serialize for NoteId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Note Types
// ============================================================================

/// A persisted note as returned to API clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Immutable identifier.
    pub id: NoteId,
    /// Free-form label.
    pub name: String,
    /// Last time the note was created or edited.
    pub last_edited_ts: DateTime<Utc>,
    /// Free-form body.
    pub text: String,
}

impl Note {
    /// Builds a new note from a request, stamped with `now`.
    pub fn from_request(request: NoteRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: NoteId::at(now),
            name: request.name,
            last_edited_ts: now,
            text: request.text,
        }
    }
}

/// Body accepted by create and update. Missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteRequest {
    pub name: String,
    pub text: String,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn note_id_display_is_24_lowercase_hex() {
        let id = NoteId::new();
        let s = id.to_string();
        assert_eq!(s.len(), NOTE_ID_HEX_LEN);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(s, id.to_hex());
    }

    #[test]
    fn note_id_display_fromstr() {
        let id = NoteId::from_bytes([0xab; NOTE_ID_LEN]);
        let parsed: NoteId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn note_id_parses_uppercase() {
        let parsed: NoteId = "ABCDEF0123456789ABCDEF01".parse().unwrap();
        assert_eq!(parsed.to_string(), "abcdef0123456789abcdef01");
    }

    #[test]
    fn note_id_all_zero() {
        let parsed: NoteId = "000000000000000000000000".parse().unwrap();
        assert_eq!(parsed, NoteId::from_bytes([0; NOTE_ID_LEN]));
    }

    #[test]
    fn note_id_parse_error_reports_invalid_byte() {
        let err = "zz".parse::<NoteId>().unwrap_err();
        assert_eq!(
            err,
            NoteIdParseError::InvalidByte {
                byte: 'z',
                position: 0
            }
        );
        assert!(err.to_string().contains("invalid byte"));
    }

    #[test]
    fn note_id_parse_error_invalid_length() {
        let err = "abcd".parse::<NoteId>().unwrap_err();
        assert_eq!(err, NoteIdParseError::InvalidLength(4));

        let err = "".parse::<NoteId>().unwrap_err();
        assert_eq!(err, NoteIdParseError::InvalidLength(0));

        let err = "0".repeat(26).parse::<NoteId>().unwrap_err();
        assert_eq!(err, NoteIdParseError::InvalidLength(26));
    }

    #[test]
    fn note_id_parse_error_odd_length() {
        let err = "0".repeat(23).parse::<NoteId>().unwrap_err();
        assert_eq!(err, NoteIdParseError::OddLength);
    }

    #[test]
    fn note_id_rejects_everything_but_24_hex() {
        for bad in [
            "test",
            "zz",
            "00000000000000000000000g",
            "000000000000000000000000 ",
            " 000000000000000000000000",
            "0x0000000000000000000000",
            "ééééééééééééééééééééééé",
        ] {
            assert!(bad.parse::<NoteId>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn note_id_prefix_is_creation_time() {
        let now = Utc::now();
        let id = NoteId::at(now);
        assert_eq!(id.timestamp_secs() as i64, now.timestamp());
    }

    #[test]
    fn note_ids_are_unique_within_process() {
        let now = Utc::now();
        let ids: HashSet<NoteId> = (0..1000).map(|_| NoteId::at(now)).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn note_id_serializes_as_string() {
        let id = NoteId::from_bytes([1; NOTE_ID_LEN]);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"010101010101010101010101\"");
        let restored: NoteId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn note_serializes_camel_case_rfc3339() {
        let ts = DateTime::parse_from_rfc3339("2024-03-01T12:30:00.250Z")
            .unwrap()
            .with_timezone(&Utc);
        let note = Note {
            id: NoteId::from_bytes([0; NOTE_ID_LEN]),
            name: "hello".into(),
            last_edited_ts: ts,
            text: "world".into(),
        };
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["id"], "000000000000000000000000");
        assert_eq!(value["name"], "hello");
        assert_eq!(value["text"], "world");
        assert_eq!(value["lastEditedTs"], "2024-03-01T12:30:00.250Z");
    }

    #[test]
    fn note_from_request_copies_fields() {
        let now = Utc::now();
        let note = Note::from_request(
            NoteRequest {
                name: "n".into(),
                text: "t".into(),
            },
            now,
        );
        assert_eq!(note.name, "n");
        assert_eq!(note.text, "t");
        assert_eq!(note.last_edited_ts, now);
    }

    #[test]
    fn note_request_defaults_missing_fields() {
        let request: NoteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, NoteRequest::default());

        let request: NoteRequest = serde_json::from_str(r#"{"name":"only"}"#).unwrap();
        assert_eq!(request.name, "only");
        assert_eq!(request.text, "");
    }
}
