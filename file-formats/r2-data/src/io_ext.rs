//! Sequential little-endian field reader for R2 asset streams
//!
//! The wire layouts are strictly order-dependent, so the reader only
//! moves forward: fixed-width scalars, fixed-size string fields that
//! always consume their full width, and explicit skips over reserved
//! blocks. Any short read surfaces as [`std::io::ErrorKind::UnexpectedEof`].

use std::io::{Read, Result};

use glam::{Mat4, Quat, Vec2, Vec3};
use memchr::memchr;

/// Extension trait adding the R2 wire primitives to any [`Read`]
pub trait ReadExt: Read {
    fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    fn read_i32_le(&mut self) -> Result<i32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    fn read_f32_le(&mut self) -> Result<f32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(f32::from_le_bytes(buf))
    }

    /// Consume and discard `count` bytes of reserved/opaque data
    ///
    /// Fails if the stream ends before the block is fully consumed, so
    /// cursor alignment errors surface at the reserved field rather
    /// than at the next semantic one.
    fn skip(&mut self, count: usize) -> Result<()> {
        let mut remaining = count;
        let mut buf = [0u8; 256];
        while remaining > 0 {
            let chunk = remaining.min(buf.len());
            self.read_exact(&mut buf[..chunk])?;
            remaining -= chunk;
        }
        Ok(())
    }

    /// Read a fixed-size string field of exactly `limit` bytes
    ///
    /// The field is NUL-padded on the wire: characters accumulate until
    /// the first NUL byte, the rest of the field is consumed but
    /// discarded. Invalid UTF-8 sequences are dropped, not replaced.
    fn read_fixed_string(&mut self, limit: usize) -> Result<String> {
        let mut buf = vec![0u8; limit];
        self.read_exact(&mut buf)?;
        let end = memchr(0, &buf).unwrap_or(limit);
        Ok(utf8_dropping_invalid(&buf[..end]))
    }

    fn read_vec2_le(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32_le()?, self.read_f32_le()?))
    }

    fn read_vec3_le(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    /// Read a quaternion stored as x, y, z, w
    fn read_quat_le(&mut self) -> Result<Quat> {
        Ok(Quat::from_xyzw(
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
            self.read_f32_le()?,
        ))
    }

    /// Read a 4x4 matrix stored as 16 consecutive `f32`, row-major
    fn read_mat4_le(&mut self) -> Result<Mat4> {
        let mut vals = [0.0f32; 16];
        for v in &mut vals {
            *v = self.read_f32_le()?;
        }
        // Wire rows become glam rows; glam stores columns internally.
        Ok(Mat4::from_cols_array(&vals).transpose())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Decode bytes as UTF-8, dropping any invalid sequences
fn utf8_dropping_invalid(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                out.push_str(s);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let bad = e.error_len().unwrap_or(after.len());
                rest = &after[bad..];
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_scalars_little_endian() {
        let data = [0x2A, 0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x80, 0x3F];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_u8().unwrap(), 0x2A);
        assert_eq!(cursor.read_u16_le().unwrap(), 1);
        assert_eq!(cursor.read_i32_le().unwrap(), -1);
        assert_eq!(cursor.read_f32_le().unwrap(), 1.0);
    }

    #[test]
    fn test_fixed_string_consumes_full_field() {
        let mut data = b"tex.dds\0".to_vec();
        data.resize(16, 0xAB); // junk after the terminator is discarded
        data.push(0x07); // next field
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_fixed_string(16).unwrap(), "tex.dds");
        assert_eq!(cursor.read_u8().unwrap(), 0x07);
    }

    #[test]
    fn test_fixed_string_without_nul() {
        let mut cursor = Cursor::new(&b"abcdef"[..]);
        assert_eq!(cursor.read_fixed_string(6).unwrap(), "abcdef");
    }

    #[test]
    fn test_fixed_string_drops_invalid_utf8() {
        let data = [b'a', 0xFF, b'b', 0xC3, 0x28, b'c', 0x00, 0x00];
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_fixed_string(8).unwrap(), "ab(c");
    }

    #[test]
    fn test_fixed_string_truncated_is_io_error() {
        let mut cursor = Cursor::new(&b"abc"[..]);
        let err = cursor.read_fixed_string(8).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_skip_advances_cursor() {
        let mut data = vec![0u8; 2000];
        data.push(0x5A);
        let mut cursor = Cursor::new(&data[..]);
        cursor.skip(2000).unwrap();
        assert_eq!(cursor.read_u8().unwrap(), 0x5A);
    }

    #[test]
    fn test_skip_past_end_is_io_error() {
        let mut cursor = Cursor::new(&[0u8; 10][..]);
        assert!(cursor.skip(11).is_err());
    }

    #[test]
    fn test_mat4_row_major() {
        let mut data = Vec::new();
        for i in 0..16 {
            data.extend_from_slice(&(i as f32).to_le_bytes());
        }
        let mut cursor = Cursor::new(&data[..]);
        let mat = cursor.read_mat4_le().unwrap();
        // First wire row is (0, 1, 2, 3)
        assert_eq!(mat.row(0), glam::Vec4::new(0.0, 1.0, 2.0, 3.0));
        assert_eq!(mat.row(3), glam::Vec4::new(12.0, 13.0, 14.0, 15.0));
    }

    #[test]
    fn test_quat_xyzw_order() {
        let mut data = Vec::new();
        for v in [0.0f32, 0.0, 0.0, 1.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut cursor = Cursor::new(&data[..]);
        assert_eq!(cursor.read_quat_le().unwrap(), Quat::IDENTITY);
    }
}
