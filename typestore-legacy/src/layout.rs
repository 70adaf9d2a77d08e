//! Binary record framing.
//!
//! Members are laid out in definition order. Fixed-length members occupy
//! exactly their persistent length. Variable-length members are an 8-byte
//! little-endian payload length followed by the payload. A complex member's
//! payload is a sequence of entries, each laid out by its nested members.
//! Values handed out by this module are payloads without the length header.

use crate::error::{LegacyError, LegacyResult};
use crate::handler::ObjectId;
use typestore_schema::{BinaryLengthResolver, Member, TypeMember};

const LENGTH_HEADER: usize = BinaryLengthResolver::LENGTH_HEADER_LENGTH as usize;

struct Cursor<'a> {
    type_name: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: u64) -> LegacyResult<&'a [u8]> {
        let available = self.bytes.len() - self.pos;
        match usize::try_from(len) {
            Ok(len) if len <= available => {
                let slice = &self.bytes[self.pos..self.pos + len];
                self.pos += len;
                Ok(slice)
            }
            _ => Err(LegacyError::TruncatedRecord {
                type_name: self.type_name.to_owned(),
                offset: self.bytes.len(),
                needed: len - available as u64,
            }),
        }
    }

    fn read_value(&mut self, member: &Member) -> LegacyResult<&'a [u8]> {
        if member.is_fixed_length() {
            return self.take(member.persistent_minimum_length());
        }
        let header = self.take(LENGTH_HEADER as u64)?;
        let mut length = [0u8; LENGTH_HEADER];
        length.copy_from_slice(header);
        self.take(u64::from_le_bytes(length))
    }

    fn finish(&self) -> LegacyResult<()> {
        let remaining = self.bytes.len() - self.pos;
        if remaining == 0 {
            Ok(())
        } else {
            Err(LegacyError::TrailingBytes {
                type_name: self.type_name.to_owned(),
                remaining,
            })
        }
    }
}

/// Splits `record` into one value per member.
pub fn read_record(
    type_name: &str,
    members: &[Member],
    record: &[u8],
) -> LegacyResult<Vec<Vec<u8>>> {
    let mut cursor = Cursor {
        type_name,
        bytes: record,
        pos: 0,
    };
    let values = members
        .iter()
        .map(|m| cursor.read_value(m).map(<[u8]>::to_vec))
        .collect::<LegacyResult<Vec<_>>>()?;
    cursor.finish()?;
    Ok(values)
}

/// Frames one value per member into a record.
#[must_use]
pub fn write_record(members: &[Member], values: &[Vec<u8>]) -> Vec<u8> {
    let mut record = Vec::with_capacity(values.iter().map(|v| v.len() + LENGTH_HEADER).sum());
    for (member, value) in members.iter().zip(values) {
        if member.is_fixed_length() {
            let width = usize::try_from(member.persistent_minimum_length()).unwrap_or(usize::MAX);
            let start = record.len();
            record.extend_from_slice(&value[..value.len().min(width)]);
            record.resize(start + width, 0);
        } else {
            record.extend_from_slice(&(value.len() as u64).to_le_bytes());
            record.extend_from_slice(value);
        }
    }
    record
}

/// Zero-filled value of a member: its fixed width, or an empty payload.
#[must_use]
pub fn default_value(member: &Member) -> Vec<u8> {
    if member.is_fixed_length() {
        vec![0; usize::try_from(member.persistent_minimum_length()).unwrap_or(0)]
    } else {
        Vec::new()
    }
}

/// Decodes a reference value. Zero is the null reference.
#[must_use]
pub fn decode_reference(value: &[u8]) -> ObjectId {
    let mut id = [0u8; 8];
    let len = value.len().min(8);
    id[..len].copy_from_slice(&value[..len]);
    ObjectId::new(u64::from_le_bytes(id))
}

/// Visits every non-null reference held by `value` of `member`, nested entries included.
pub fn visit_value_references(
    type_name: &str,
    member: &Member,
    value: &[u8],
    visitor: &mut dyn FnMut(ObjectId),
) -> LegacyResult<()> {
    if member.is_reference() {
        let id = decode_reference(value);
        if !id.is_null() {
            visitor(id);
        }
        return Ok(());
    }
    let nested = member.nested_members();
    if nested.is_empty() || !member.has_references() {
        return Ok(());
    }
    let mut cursor = Cursor {
        type_name,
        bytes: value,
        pos: 0,
    };
    while cursor.pos < value.len() {
        let entry_start = cursor.pos;
        for entry_member in nested {
            let entry_value = cursor.read_value(entry_member)?;
            visit_value_references(type_name, entry_member, entry_value, visitor)?;
        }
        if cursor.pos == entry_start {
            break;
        }
    }
    Ok(())
}

/// Visits every non-null reference in a persisted record.
pub fn visit_record_references(
    type_name: &str,
    members: &[Member],
    record: &[u8],
    visitor: &mut dyn FnMut(ObjectId),
) -> LegacyResult<()> {
    let mut cursor = Cursor {
        type_name,
        bytes: record,
        pos: 0,
    };
    for member in members {
        let value = cursor.read_value(member)?;
        visit_value_references(type_name, member, value, visitor)?;
    }
    cursor.finish()
}
