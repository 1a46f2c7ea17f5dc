use bon::Builder;
use time::{Date, Month};

use super::entry::SignedEntry;
use super::extensions::LeafIndex;
use crate::error::{Result, SctError};
use crate::key::KeyHandle;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Midnight UTC of `date`.
    pub fn from_date(date: Date) -> Result<Self> {
        let seconds = date.midnight().assume_utc().unix_timestamp();
        let seconds = u64::try_from(seconds).map_err(|_| {
            SctError::MalformedSpecification(format!("{date} is before the Unix epoch"))
        })?;
        Ok(Self(seconds * 1000))
    }

    /// Parses a `YYYYMMDD` date.
    pub fn parse_date(text: &str) -> Result<Self> {
        Self::from_date(parse_yyyymmdd(text)?)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }
}

/// Parses a `YYYYMMDD` calendar date.
pub fn parse_yyyymmdd(text: &str) -> Result<Date> {
    let malformed = || SctError::MalformedSpecification(format!("invalid date \"{text}\""));
    if text.len() != 8 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }
    let year: i32 = text[..4].parse().map_err(|_| malformed())?;
    let month: u8 = text[4..6].parse().map_err(|_| malformed())?;
    let day: u8 = text[6..].parse().map_err(|_| malformed())?;
    let month = Month::try_from(month).map_err(|_| malformed())?;
    Date::from_calendar_date(year, month, day).map_err(|_| malformed())
}

/// Everything needed to build one SCT.
///
/// A request is immutable once built, tamper mode included.
///
/// ```rust
/// use sctkit::key::KeyPair;
/// use sctkit::sct::{SignedEntry, SigningRequest, Timestamp};
///
/// # fn main() -> Result<(), sctkit::error::SctError> {
/// let request = SigningRequest::builder()
///     .key(KeyPair::derive_ecdsa_p256(b"log")?)
///     .timestamp(Timestamp::parse_date("20200101")?)
///     .signed_entry(SignedEntry::X509 { certificate: vec![0x30, 0x00] })
///     .build();
/// assert!(!request.tamper());
/// assert!(request.leaf_index().is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Builder)]
pub struct SigningRequest<K: KeyHandle> {
    key: K,
    timestamp: Timestamp,
    signed_entry: SignedEntry,
    #[builder(default)]
    tamper: bool,
    leaf_index: Option<LeafIndex>,
}

impl<K: KeyHandle> SigningRequest<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn signed_entry(&self) -> &SignedEntry {
        &self.signed_entry
    }

    pub fn tamper(&self) -> bool {
        self.tamper
    }

    pub fn leaf_index(&self) -> Option<LeafIndex> {
        self.leaf_index
    }
}
