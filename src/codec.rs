//! Big-endian, length-prefixed writing for the TLS presentation language
//! structures of RFC 6962.

use std::io::Write;

use byteorder::{BigEndian, WriteBytesExt};

use crate::error::{Result, SctError};

pub trait WriteLengthPrefixedBytesExt: Write {
    /// Write `data` preceded by its length as an `nbytes`-wide big-endian
    /// integer.
    ///
    /// # Errors
    ///
    /// Returns `EncodingOverflow` naming `field` if the length does not fit
    /// in `nbytes` bytes. Nothing is written in that case.
    ///
    /// # Panics
    ///
    /// `write_uint` requires that `1 <= nbytes <= 8`, and will panic otherwise.
    #[inline]
    fn write_length_prefixed(
        &mut self,
        field: &'static str,
        data: &[u8],
        nbytes: usize,
    ) -> Result<()> {
        let length = data.len() as u64;
        let max = max_length(nbytes);
        if length > max {
            return Err(SctError::EncodingOverflow { field, length, max });
        }
        self.write_uint::<BigEndian>(length, nbytes)?;
        self.write_all(data)?;
        Ok(())
    }
}

/// All types that implement `Write` get methods defined in
/// `WriteLengthPrefixedBytesExt` for free.
impl<W: Write + ?Sized> WriteLengthPrefixedBytesExt for W {}

/// The largest length representable in `nbytes` bytes.
pub fn max_length(nbytes: usize) -> u64 {
    if nbytes >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * nbytes)) - 1
    }
}
