// Copyright 2015 Ted Mielczarek. See the COPYRIGHT
// file at the top-level directory of this distribution.

//! Bounds-checked reads over the bytes of a minidump.
//!
//! Every offset in a minidump is relative to some buffer, either the whole file (an RVA)
//! or a single stream. [`ByteCursor`] wraps such a buffer together with the dump's byte
//! order and checks `offset + size <= len` before every read, so a corrupt offset turns
//! into an [`OutOfBounds`] error instead of a panic.

use crashdump_format::format as md;
use encoding_rs::{UTF_16BE, UTF_16LE};
use scroll::ctx::{SizeWith, TryFromCtx};
use scroll::{Endian, Pread};

/// A read that would have gone past the end of the buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("read of {len} bytes at offset {offset:#x} is out of bounds")]
pub struct OutOfBounds {
    /// The offset the read started at.
    pub offset: usize,
    /// The number of bytes requested.
    pub len: usize,
}

/// Read-only, bounds-checked access to a byte buffer in a fixed byte order.
///
/// Cursors are cheap to copy and never advance on their own; every read names its offset.
#[derive(Debug, Copy, Clone)]
pub struct ByteCursor<'a> {
    bytes: &'a [u8],
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    pub fn new(bytes: &'a [u8], endian: Endian) -> ByteCursor<'a> {
        ByteCursor { bytes, endian }
    }

    /// The underlying bytes.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Get `len` bytes starting at `offset`.
    pub fn read_bytes(&self, offset: usize, len: usize) -> Result<&'a [u8], OutOfBounds> {
        offset
            .checked_add(len)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(OutOfBounds { offset, len })
    }

    /// A cursor over `len` bytes starting at `offset`, sharing this cursor's byte order.
    pub fn sub_cursor(&self, offset: usize, len: usize) -> Result<ByteCursor<'a>, OutOfBounds> {
        Ok(ByteCursor::new(self.read_bytes(offset, len)?, self.endian))
    }

    /// A cursor over the data a location descriptor points at.
    pub fn location(
        &self,
        location: &md::MINIDUMP_LOCATION_DESCRIPTOR,
    ) -> Result<ByteCursor<'a>, OutOfBounds> {
        self.sub_cursor(location.rva as usize, location.data_size as usize)
    }

    /// Read any fixed-size value (integers or `Pread` structs) at `offset`.
    pub fn read<T>(&self, offset: usize) -> Result<T, OutOfBounds>
    where
        T: TryFromCtx<'a, Endian, Error = scroll::Error> + SizeWith<Endian>,
    {
        let len = T::size_with(&self.endian);
        let bytes = self.read_bytes(offset, len)?;
        bytes
            .pread_with(0, self.endian)
            .or(Err(OutOfBounds { offset, len }))
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, OutOfBounds> {
        self.read(offset)
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, OutOfBounds> {
        self.read(offset)
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, OutOfBounds> {
        self.read(offset)
    }

    pub fn read_u64(&self, offset: usize) -> Result<u64, OutOfBounds> {
        self.read(offset)
    }

    pub fn read_i64(&self, offset: usize) -> Result<i64, OutOfBounds> {
        self.read(offset)
    }

    /// Read `count` consecutive values of `T` starting at `offset`.
    ///
    /// The whole array is bounds-checked before anything is decoded, so a huge `count`
    /// from a corrupt dump fails without allocating.
    pub fn read_fixed_array<T>(&self, offset: usize, count: usize) -> Result<Vec<T>, OutOfBounds>
    where
        T: TryFromCtx<'a, Endian, Error = scroll::Error> + SizeWith<Endian>,
    {
        let element_size = T::size_with(&self.endian);
        let len = count
            .checked_mul(element_size)
            .ok_or(OutOfBounds { offset, len: usize::MAX })?;
        self.read_bytes(offset, len)?;
        (0..count)
            .map(|i| self.read(offset + i * element_size))
            .collect()
    }

    /// Read a `NUL`-terminated string at `offset`.
    ///
    /// The string stops at the first `NUL` or at the end of the buffer, whichever comes
    /// first. Invalid UTF-8 is replaced rather than rejected.
    pub fn read_cstring(&self, offset: usize) -> Result<String, OutOfBounds> {
        let rest = self
            .bytes
            .get(offset..)
            .ok_or(OutOfBounds { offset, len: 1 })?;
        let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
        Ok(String::from_utf8_lossy(&rest[..end]).into_owned())
    }

    /// Read a `u32` length-prefixed run of bytes at `offset` (a `MINIDUMP_BYTE_ARRAY`).
    pub fn read_byte_array(&self, offset: usize) -> Result<&'a [u8], OutOfBounds> {
        let len = self.read_u32(offset)? as usize;
        self.read_bytes(offset + 4, len)
    }

    /// Read a `u32` length-prefixed UTF-8 string at `offset` (a `MINIDUMP_UTF8_STRING`).
    ///
    /// The length excludes the trailing `NUL` writers put after the bytes, which is not
    /// required here.
    pub fn read_utf8_string(&self, offset: usize) -> Result<String, OutOfBounds> {
        let bytes = self.read_byte_array(offset)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a `u32` length-prefixed UTF-16 string at `offset` (a `MINIDUMP_STRING`).
    ///
    /// The length is in bytes and the code units are in the cursor's byte order.
    pub fn read_utf16_string(&self, offset: usize) -> Result<String, OutOfBounds> {
        let bytes = self.read_byte_array(offset)?;
        let encoding = match self.endian {
            Endian::Little => UTF_16LE,
            Endian::Big => UTF_16BE,
        };
        let (string, _had_errors) = encoding.decode_without_bom_handling(bytes);
        Ok(string.into_owned())
    }
}

/// Decode a fixed-width UTF-16 buffer, stopping at the first `NUL`.
pub fn utf16_to_string(data: &[u16]) -> String {
    let len = data.iter().take_while(|c| **c != 0).count();
    let bytes: Vec<u8> = data[..len].iter().flat_map(|c| c.to_le_bytes()).collect();
    let (string, _had_errors) = UTF_16LE.decode_without_bom_handling(&bytes);
    string.into_owned()
}

#[cfg(test)]
mod test {
    use super::*;
    use scroll::{BE, LE};

    #[test]
    fn test_integers() {
        let data: [u8; 12] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0xff, 0xff, 0xff, 0xff];
        let le = ByteCursor::new(&data, LE);
        assert_eq!(le.read_u16(0), Ok(0x0201));
        assert_eq!(le.read_u32(0), Ok(0x04030201));
        assert_eq!(le.read_u64(0), Ok(0x0807060504030201));
        assert_eq!(le.read_i32(8), Ok(-1));
        let be = ByteCursor::new(&data, BE);
        assert_eq!(be.read_u32(4), Ok(0x05060708));
    }

    #[test]
    fn test_out_of_bounds() {
        let data = [0u8; 8];
        let cursor = ByteCursor::new(&data, LE);
        assert_eq!(cursor.read_u32(4), Ok(0));
        assert_eq!(cursor.read_u32(5), Err(OutOfBounds { offset: 5, len: 4 }));
        assert_eq!(cursor.read_u64(1), Err(OutOfBounds { offset: 1, len: 8 }));
        assert_eq!(
            cursor.read_bytes(usize::MAX, 2),
            Err(OutOfBounds {
                offset: usize::MAX,
                len: 2
            })
        );
        assert_eq!(cursor.read_bytes(8, 0), Ok(&b""[..]));
    }

    #[test]
    fn test_reads_are_repeatable() {
        let data: [u8; 4] = [0xde, 0xad, 0xbe, 0xef];
        let cursor = ByteCursor::new(&data, BE);
        assert_eq!(cursor.read_u32(0), cursor.read_u32(0));
    }

    #[test]
    fn test_fixed_array() {
        let data: [u8; 6] = [1, 0, 2, 0, 3, 0];
        let cursor = ByteCursor::new(&data, LE);
        assert_eq!(cursor.read_fixed_array::<u16>(0, 3), Ok(vec![1, 2, 3]));
        assert_eq!(cursor.read_fixed_array::<u16>(2, 2), Ok(vec![2, 3]));
        assert_eq!(
            cursor.read_fixed_array::<u16>(2, 3),
            Err(OutOfBounds { offset: 2, len: 6 })
        );
        assert!(cursor.read_fixed_array::<u64>(0, usize::MAX).is_err());
    }

    #[test]
    fn test_cstring() {
        let data = b"hello\0world";
        let cursor = ByteCursor::new(data, LE);
        assert_eq!(cursor.read_cstring(0).unwrap(), "hello");
        // No terminator: stop at the end of the buffer.
        assert_eq!(cursor.read_cstring(6).unwrap(), "world");
        assert_eq!(cursor.read_cstring(11).unwrap(), "");
        assert!(cursor.read_cstring(12).is_err());
    }

    #[test]
    fn test_utf8_string() {
        let data: [u8; 8] = [3, 0, 0, 0, b'a', b'b', b'c', 0];
        let cursor = ByteCursor::new(&data, LE);
        assert_eq!(cursor.read_utf8_string(0).unwrap(), "abc");
        assert_eq!(cursor.read_byte_array(0).unwrap(), b"abc");

        let truncated: [u8; 6] = [8, 0, 0, 0, b'a', b'b'];
        let cursor = ByteCursor::new(&truncated, LE);
        assert_eq!(
            cursor.read_utf8_string(0),
            Err(OutOfBounds { offset: 4, len: 8 })
        );
    }

    #[test]
    fn test_utf16_string() {
        let le: [u8; 8] = [4, 0, 0, 0, b'h', 0, b'i', 0];
        assert_eq!(ByteCursor::new(&le, LE).read_utf16_string(0).unwrap(), "hi");
        let be: [u8; 8] = [0, 0, 0, 4, 0, b'h', 0, b'i'];
        assert_eq!(ByteCursor::new(&be, BE).read_utf16_string(0).unwrap(), "hi");
    }

    #[test]
    fn test_utf16_to_string() {
        let units = [b'U' as u16, b'T' as u16, b'C' as u16, 0, b'x' as u16];
        assert_eq!(utf16_to_string(&units), "UTC");
        assert_eq!(utf16_to_string(&[0; 4]), "");
    }

    #[test]
    fn test_location() {
        let data: [u8; 6] = [0, 1, 2, 3, 4, 5];
        let cursor = ByteCursor::new(&data, LE);
        let loc = md::MINIDUMP_LOCATION_DESCRIPTOR {
            data_size: 2,
            rva: 3,
        };
        assert_eq!(cursor.location(&loc).unwrap().bytes(), &[3, 4]);
        let bad = md::MINIDUMP_LOCATION_DESCRIPTOR {
            data_size: 4,
            rva: 3,
        };
        assert_eq!(
            cursor.location(&bad).unwrap_err(),
            OutOfBounds { offset: 3, len: 4 }
        );
    }
}
