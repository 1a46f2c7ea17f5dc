use byteorder::{BigEndian, WriteBytesExt};

use super::entry::EncodedEntry;
use super::request::Timestamp;
use crate::error::Result;

/// `Version.v1`.
pub const SCT_VERSION_V1: u8 = 0;

/// `SignatureType.certificate_timestamp`.
pub const SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP: u8 = 0;

/// Assembles the `digitally-signed` struct of RFC 6962 section 3.2:
/// `version ‖ signature_type ‖ timestamp ‖ entry_type ‖ entry ‖ extensions`.
pub fn signing_input(
    timestamp: Timestamp,
    entry: &EncodedEntry,
    extensions: &[u8],
) -> Result<Vec<u8>> {
    let mut input = Vec::with_capacity(12 + entry.payload.len() + extensions.len());
    input.write_u8(SCT_VERSION_V1)?;
    input.write_u8(SIGNATURE_TYPE_CERTIFICATE_TIMESTAMP)?;
    input.write_u64::<BigEndian>(timestamp.as_millis())?;
    entry.write_to(&mut input)?;
    input.extend_from_slice(extensions);
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sct::entry::SignedEntry;

    #[test]
    fn fields_are_in_order() {
        let entry = SignedEntry::X509 {
            certificate: vec![0xc0, 0xde],
        }
        .encode()
        .unwrap();
        let input =
            signing_input(Timestamp::from_millis(0x0102_0304_0506_0708), &entry, &[0, 0]).unwrap();
        assert_eq!(
            hex::encode(input),
            concat!(
                "00",               // version
                "00",               // signature type
                "0102030405060708", // timestamp
                "0000",             // entry type
                "000002c0de",       // certificate
                "0000",             // extensions
            )
        );
    }

    #[test]
    fn precert_entry_type() {
        let entry = EncodedEntry {
            entry_type: crate::sct::entry::EntryType::Precert,
            payload: vec![],
        };
        let input = signing_input(Timestamp::from_millis(0), &entry, &[0, 0]).unwrap();
        assert_eq!(&input[10..12], &[0, 1]);
    }
}
