use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Fixed header at the start of every biometric information record.
///
/// All multi-byte fields are little endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct BirHeader {
    /// Total record length in bytes, header included.
    pub length: u32,
    pub header_version: u8,
    pub bir_type: u8,
    pub format_owner: u16,
    pub format_id: u16,
    pub quality: i8,
    pub purpose: u8,
    pub factors_mask: u32,
}

impl BirHeader {
    pub const SIZE: usize = std::mem::size_of::<BirHeader>();

    /// Read the header from the first bytes of a buffer.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let raw = bytes.get(..Self::SIZE)?;
        let header: BirHeader = bytemuck::pod_read_unaligned(raw);
        Some(header.swap_le())
    }

    fn swap_le(self) -> Self {
        Self {
            length: u32::from_le(self.length),
            format_owner: u16::from_le(self.format_owner),
            format_id: u16::from_le(self.format_id),
            factors_mask: u32::from_le(self.factors_mask),
            ..self
        }
    }

    fn to_bytes(self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out.copy_from_slice(bytemuck::bytes_of(&self.swap_le()));
        out
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BirError {
    #[error("record is {len} bytes, shorter than the {} byte header", BirHeader::SIZE)]
    TooShort { len: usize },
    #[error("header declares {declared} bytes but {available} are available")]
    BadLength { declared: usize, available: usize },
}

/// Opaque biometric template. The engine owns the format; callers only rely
/// on the header's length field.
///
/// Not `Clone`: the holder releases it through the path it came from.
pub struct Bir {
    data: Vec<u8>,
}

impl Bir {
    /// Wrap raw bytes, checking that the header is present and its length
    /// fits the buffer. Trailing bytes beyond `header.length` are kept.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, BirError> {
        let header = BirHeader::parse(&data).ok_or(BirError::TooShort { len: data.len() })?;
        let declared = header.length as usize;
        if declared < BirHeader::SIZE || declared > data.len() {
            return Err(BirError::BadLength {
                declared,
                available: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Build a record around an engine-specific payload.
    pub fn with_payload(template: BirHeader, payload: &[u8]) -> Self {
        let header = BirHeader {
            length: (BirHeader::SIZE + payload.len()) as u32,
            ..template
        };
        let mut data = Vec::with_capacity(header.length as usize);
        data.extend_from_slice(&header.to_bytes());
        data.extend_from_slice(payload);
        Self { data }
    }

    pub fn header(&self) -> BirHeader {
        // Validated on construction.
        BirHeader::parse(&self.data).unwrap_or_else(BirHeader::zeroed)
    }

    /// Number of bytes that make up the record according to its header.
    pub fn len(&self) -> usize {
        self.header().length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exactly `header.length` bytes: what gets written back to a file.
    pub fn record_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[BirHeader::SIZE..self.len()]
    }

    /// Whole underlying buffer, including any trailing bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl fmt::Debug for Bir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bir")
            .field("length", &self.len())
            .field("buffer", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_sixteen_bytes() {
        assert_eq!(BirHeader::SIZE, 16);
    }

    #[test]
    fn payload_round_trips_through_bytes() {
        let bir = Bir::with_payload(BirHeader::zeroed(), b"ridge");
        assert_eq!(bir.len(), 16 + 5);
        let copy = Bir::from_bytes(bir.as_bytes().to_vec()).unwrap();
        assert_eq!(copy.payload(), b"ridge");
        assert_eq!(copy.header(), bir.header());
    }

    #[test]
    fn trailing_bytes_are_not_part_of_the_record() {
        let mut bytes = Bir::with_payload(BirHeader::zeroed(), b"abc").into_bytes();
        bytes.extend_from_slice(b"garbage");
        let bir = Bir::from_bytes(bytes).unwrap();
        assert_eq!(bir.record_bytes().len(), 19);
        assert_eq!(bir.as_bytes().len(), 26);
    }

    #[test]
    fn rejects_truncated_records() {
        assert_eq!(
            Bir::from_bytes(vec![0; 4]).unwrap_err(),
            BirError::TooShort { len: 4 }
        );

        let mut bytes = Bir::with_payload(BirHeader::zeroed(), b"abcdef").into_bytes();
        bytes.truncate(18);
        assert_eq!(
            Bir::from_bytes(bytes).unwrap_err(),
            BirError::BadLength {
                declared: 22,
                available: 18
            }
        );
    }

    #[test]
    fn header_length_is_little_endian() {
        let bir = Bir::with_payload(BirHeader::zeroed(), &[0; 300]);
        assert_eq!(&bir.as_bytes()[..4], &316u32.to_le_bytes());
    }
}
