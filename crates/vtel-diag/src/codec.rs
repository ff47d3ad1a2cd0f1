//! Wire codec for diagnostic messages
//!
//! Fields are written in a fixed order, big-endian, with no field tags.
//! Optional fields are preceded by a presence byte (`0x00` absent, `0x01`
//! present); variable-length fields carry a `u32` length prefix.
//!
//! ```text
//! bus:u8 id:u32 mode:u8 pid:opt<u16> payload:opt<len+bytes>      (message)
//!   timestamp:opt<i64 secs + u32 nanos> extras:opt<len+json>
//!   + multiple_responses:u8 frequency:opt<f64> name:opt<len+utf8>  (request)
//!   + success:u8 value:opt<f64> nrc:opt<u8>                        (response)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use chrono::{DateTime, Utc};

use crate::error::{DiagnosticError, DiagnosticResult};

const ABSENT: u8 = 0x00;
const PRESENT: u8 = 0x01;

/// Types with a wire representation
pub trait WireEncode {
    /// Append this value to `buf`
    fn encode_to(&self, buf: &mut BytesMut);

    /// Encode into a fresh buffer
    fn to_wire(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode_to(&mut buf);
        buf.freeze()
    }
}

/// Types that can be read back from their wire representation
pub trait WireDecode: Sized {
    /// Read this value from the front of `reader`
    fn decode_from(reader: &mut WireReader<'_>) -> DiagnosticResult<Self>;

    /// Decode a complete buffer; trailing bytes are an error
    fn from_wire(data: &[u8]) -> DiagnosticResult<Self> {
        let mut reader = WireReader::new(data);
        let value = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Write helpers shared by the message encoders
pub(crate) trait WireBufExt {
    fn put_flag(&mut self, flag: bool);
    fn put_opt_u8(&mut self, value: Option<u8>);
    fn put_opt_u16(&mut self, value: Option<u16>);
    fn put_opt_f64(&mut self, value: Option<f64>);
    fn put_opt_bytes(&mut self, value: Option<&[u8]>);
    fn put_opt_str(&mut self, value: Option<&str>);
    fn put_opt_timestamp(&mut self, value: Option<&DateTime<Utc>>);
}

impl WireBufExt for BytesMut {
    fn put_flag(&mut self, flag: bool) {
        self.put_u8(if flag { PRESENT } else { ABSENT });
    }

    fn put_opt_u8(&mut self, value: Option<u8>) {
        self.put_flag(value.is_some());
        if let Some(v) = value {
            self.put_u8(v);
        }
    }

    fn put_opt_u16(&mut self, value: Option<u16>) {
        self.put_flag(value.is_some());
        if let Some(v) = value {
            self.put_u16(v);
        }
    }

    fn put_opt_f64(&mut self, value: Option<f64>) {
        self.put_flag(value.is_some());
        if let Some(v) = value {
            self.put_f64(v);
        }
    }

    fn put_opt_bytes(&mut self, value: Option<&[u8]>) {
        self.put_flag(value.is_some());
        if let Some(v) = value {
            self.put_u32(v.len() as u32);
            self.put_slice(v);
        }
    }

    fn put_opt_str(&mut self, value: Option<&str>) {
        self.put_opt_bytes(value.map(str::as_bytes));
    }

    fn put_opt_timestamp(&mut self, value: Option<&DateTime<Utc>>) {
        self.put_flag(value.is_some());
        if let Some(ts) = value {
            self.put_i64(ts.timestamp());
            self.put_u32(ts.timestamp_subsec_nanos());
        }
    }
}

/// Bounds-checked reader over an encoded message
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, needed: usize) -> DiagnosticResult<()> {
        if self.buf.remaining() < needed {
            return Err(DiagnosticError::Truncated {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn u8(&mut self) -> DiagnosticResult<u8> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn u16(&mut self) -> DiagnosticResult<u16> {
        self.need(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn u32(&mut self) -> DiagnosticResult<u32> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn i64(&mut self) -> DiagnosticResult<i64> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    pub fn f64(&mut self) -> DiagnosticResult<f64> {
        self.need(8)?;
        Ok(self.buf.get_f64())
    }

    /// Strict boolean: only `0x00` and `0x01` are accepted
    pub fn flag(&mut self) -> DiagnosticResult<bool> {
        match self.u8()? {
            ABSENT => Ok(false),
            PRESENT => Ok(true),
            other => Err(DiagnosticError::InvalidFlag(other)),
        }
    }

    /// Read a presence byte, then the value if present
    pub fn optional<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> DiagnosticResult<T>,
    ) -> DiagnosticResult<Option<T>> {
        if self.flag()? {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Length-prefixed byte string
    pub fn bytes(&mut self) -> DiagnosticResult<Vec<u8>> {
        let len = self.u32()? as usize;
        self.need(len)?;
        let out = self.buf[..len].to_vec();
        self.buf.advance(len);
        Ok(out)
    }

    /// Length-prefixed UTF-8 string
    pub fn string(&mut self) -> DiagnosticResult<String> {
        String::from_utf8(self.bytes()?).map_err(|_| DiagnosticError::InvalidUtf8)
    }

    /// Seconds since the epoch followed by the sub-second nanoseconds
    pub fn timestamp(&mut self) -> DiagnosticResult<DateTime<Utc>> {
        let secs = self.i64()?;
        let nanos = self.u32()?;
        DateTime::from_timestamp(secs, nanos)
            .ok_or(DiagnosticError::InvalidTimestamp { secs, nanos })
    }

    /// Ensure the whole buffer was consumed
    pub fn finish(self) -> DiagnosticResult<()> {
        match self.buf.remaining() {
            0 => Ok(()),
            n => Err(DiagnosticError::TrailingBytes(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_optional_layout() {
        let mut buf = BytesMut::new();
        buf.put_opt_u16(Some(0x0D0C));
        buf.put_opt_u16(None);
        buf.put_opt_str(Some("rpm"));

        assert_eq!(
            &buf[..],
            &[0x01, 0x0D, 0x0C, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, b'r', b'p', b'm']
        );
    }

    #[test]
    fn test_reader_reads_back() {
        let data = [0x01, 0x0D, 0x0C, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, b'r', b'p', b'm'];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.optional(|r| r.u16()).unwrap(), Some(0x0D0C));
        assert_eq!(reader.optional(|r| r.u16()).unwrap(), None);
        assert_eq!(
            reader.optional(|r| r.string()).unwrap(),
            Some("rpm".to_string())
        );
        reader.finish().unwrap();
    }

    #[test]
    fn test_timestamp_keeps_nanoseconds() {
        let ts = DateTime::from_timestamp(1_351_176_963, 123_456_789).unwrap();
        let mut buf = BytesMut::new();
        buf.put_opt_timestamp(Some(&ts));
        assert_eq!(buf.len(), 1 + 8 + 4);

        let mut reader = WireReader::new(&buf);
        assert_eq!(reader.optional(|r| r.timestamp()).unwrap(), Some(ts));
        reader.finish().unwrap();
    }

    #[test]
    fn test_timestamp_out_of_range() {
        let mut buf = BytesMut::new();
        buf.put_i64(i64::MAX);
        buf.put_u32(0);
        let mut reader = WireReader::new(&buf);
        assert!(matches!(
            reader.timestamp(),
            Err(DiagnosticError::InvalidTimestamp { secs: i64::MAX, nanos: 0 })
        ));
    }

    #[test]
    fn test_reader_truncated() {
        let mut reader = WireReader::new(&[0x00, 0x01]);
        let err = reader.u32().unwrap_err();
        assert!(matches!(
            err,
            DiagnosticError::Truncated {
                needed: 4,
                remaining: 2
            }
        ));
    }

    #[test]
    fn test_reader_bad_length_prefix() {
        // Claims 255 bytes, has 1
        let mut reader = WireReader::new(&[0x00, 0x00, 0x00, 0xFF, 0xAA]);
        assert!(matches!(
            reader.bytes(),
            Err(DiagnosticError::Truncated { needed: 255, .. })
        ));
    }

    #[test]
    fn test_reader_rejects_bad_flag() {
        let mut reader = WireReader::new(&[0x02]);
        assert!(matches!(reader.flag(), Err(DiagnosticError::InvalidFlag(0x02))));
    }

    #[test]
    fn test_reader_rejects_invalid_utf8() {
        let mut reader = WireReader::new(&[0x00, 0x00, 0x00, 0x01, 0xFF]);
        assert!(matches!(reader.string(), Err(DiagnosticError::InvalidUtf8)));
    }

    #[test]
    fn test_finish_reports_trailing() {
        let mut reader = WireReader::new(&[0x01, 0x02, 0x03]);
        reader.u8().unwrap();
        assert!(matches!(reader.finish(), Err(DiagnosticError::TrailingBytes(2))));
    }
}
