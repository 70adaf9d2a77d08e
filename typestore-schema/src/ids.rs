//! Type identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Stable numeric identifier of one frozen structural shape of a type.
///
/// `0` is reserved and means "not assigned yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u64);

impl TypeId {
    /// The reserved "not assigned" id.
    pub const UNASSIGNED: TypeId = TypeId(0);

    /// Width of the zero-padded form written by the dictionary assembler.
    pub const PADDED_WIDTH: usize = 19;

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_assigned(&self) -> bool {
        self.0 != 0
    }

    /// Zero-padded decimal form, e.g. `0000000000000000042`.
    #[must_use]
    pub fn to_padded_string(&self) -> String {
        format!("{:0width$}", self.0, width = Self::PADDED_WIDTH)
    }
}

impl From<u64> for TypeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TypeId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padded_form_is_nineteen_digits() {
        assert_eq!(TypeId::new(42).to_padded_string(), "0000000000000000042");
        assert_eq!(TypeId::new(u64::MAX / 2).to_padded_string().len(), 19);
    }

    #[test]
    fn parses_unpadded_and_padded() {
        assert_eq!("7".parse::<TypeId>().unwrap(), TypeId::new(7));
        assert_eq!("0000000000000000007".parse::<TypeId>().unwrap(), TypeId::new(7));
        assert!("x7".parse::<TypeId>().is_err());
    }
}
