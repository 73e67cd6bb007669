//! On-disk layout of the DDELTA40 patch format.
//!
//! Both structs are read and written as raw bytes via `zerocopy`: no manual
//! field-by-field byte shuffling, no alignment requirements, and the field
//! types themselves carry the big-endian byte order mandated by the format.

use zerocopy::byteorder::big_endian::{I64, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Four-byte-times-two magic tag identifying a DDELTA40 patch stream.
pub const MAGIC: [u8; 8] = *b"DDELTA40";

/// The 16-byte patch file header: magic tag followed by the size of the
/// reconstructed *new* file.
#[repr(C)]
#[derive(Clone, Copy, Debug, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub(crate) struct PatchHeader {
    pub magic: [u8; 8],
    pub new_file_size: U64,
}

/// The 24-byte record header preceding each diff/extra payload pair. A
/// record with all three fields zero is the mandatory terminator and carries
/// no payload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
pub(crate) struct EntryHeader {
    pub diff: U64,
    pub extra: U64,
    pub seek: I64,
}

impl EntryHeader {
    pub(crate) fn is_terminator(&self) -> bool {
        self.diff.get() == 0 && self.extra.get() == 0 && self.seek.get() == 0
    }
}

/// Maps a signed relative seek to its fixed-width two's-complement wire form:
/// `u = (i >= 0) ? i : ~(-i) + 1`.
///
/// This is written out explicitly (rather than relying on the implicit bit
/// reinterpretation a plain `as u64` cast would give) so the format's
/// documented transform has one literal, testable implementation.
#[allow(dead_code)]
pub(crate) fn seek_to_unsigned(i: i64) -> u64 {
    if i >= 0 {
        i as u64
    } else {
        (!((-i) as u64)).wrapping_add(1)
    }
}

/// Inverse of [`seek_to_unsigned`]: if the high bit of `u` is set, the value
/// is `-(i64)(~(u - 1))`, otherwise it is `u` itself.
#[allow(dead_code)]
pub(crate) fn seek_from_unsigned(u: u64) -> i64 {
    if u >> 63 == 0 {
        u as i64
    } else {
        -((!(u.wrapping_sub(1))) as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seek_symmetry_known_values() {
        for i in [0i64, 1, -1, 8, -8, i64::MAX, i64::MIN, i64::MIN + 1] {
            assert_eq!(seek_from_unsigned(seek_to_unsigned(i)), i);
        }
    }

    #[test]
    fn seek_symmetry_random() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let i: i64 = rng.gen();
            assert_eq!(seek_from_unsigned(seek_to_unsigned(i)), i);
        }
    }

    #[test]
    fn header_round_trips_through_bytes() {
        use zerocopy::{IntoBytes, Ref};
        let header = PatchHeader {
            magic: MAGIC,
            new_file_size: U64::new(42),
        };
        let bytes = header.as_bytes();
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..8], b"DDELTA40");
        let parsed = Ref::<_, PatchHeader>::from_bytes(bytes).unwrap();
        assert_eq!(parsed.new_file_size.get(), 42);
    }
}
