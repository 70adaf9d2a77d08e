//! Conversion of single member values from a legacy to a current representation.

use crate::error::LegacyResult;
use std::fmt;
use typestore_schema::{Member, PrimitiveKind, TypeMember};

/// Converts the value of a legacy member into the current member's representation.
pub trait ValueTranslator: Send + Sync + fmt::Debug {
    fn translate(&self, legacy: &Member, current: &Member, value: &[u8]) -> LegacyResult<Vec<u8>>;
}

/// Byte-copying translator.
///
/// Fixed-length targets are resized to their width. Signed integer primitives
/// are sign-extended when widened; everything else is zero-extended or
/// truncated. Variable-length values are copied unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResizingTranslator;

impl ValueTranslator for ResizingTranslator {
    fn translate(&self, legacy: &Member, current: &Member, value: &[u8]) -> LegacyResult<Vec<u8>> {
        if !current.is_fixed_length() {
            return Ok(value.to_vec());
        }
        let width = usize::try_from(current.persistent_minimum_length()).unwrap_or(usize::MAX);
        let mut out = value[..value.len().min(width)].to_vec();
        let fill = match value.last() {
            Some(last)
                if is_signed_integer(legacy) && is_signed_integer(current) && last & 0x80 != 0 =>
            {
                0xff
            }
            _ => 0,
        };
        out.resize(width, fill);
        Ok(out)
    }
}

fn is_signed_integer(member: &Member) -> bool {
    matches!(
        PrimitiveKind::from_type_name(member.type_name()),
        Some(PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use typestore_schema::BinaryLengthResolver;

    #[test]
    fn widening_int_to_long_sign_extends() {
        let legacy = Member::simple("int", "count", &BinaryLengthResolver);
        let current = Member::simple("long", "count", &BinaryLengthResolver);
        let minus_two = (-2i32).to_le_bytes();
        let widened = ResizingTranslator.translate(&legacy, &current, &minus_two).unwrap();
        assert_eq!(widened, (-2i64).to_le_bytes().to_vec());
    }

    #[test]
    fn narrowing_truncates() {
        let legacy = Member::simple("long", "count", &BinaryLengthResolver);
        let current = Member::simple("int", "count", &BinaryLengthResolver);
        let narrowed = ResizingTranslator
            .translate(&legacy, &current, &7i64.to_le_bytes())
            .unwrap();
        assert_eq!(narrowed, 7i32.to_le_bytes().to_vec());
    }
}
