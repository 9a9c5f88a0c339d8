//! IPv4 CIDR blocks.
//!
//! An [`AddressValue`] is a network base address plus a prefix length. The
//! base never has host bits set, so every value names exactly one aligned
//! block of `2^(32 - prefix)` addresses.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Errors produced while building or subdividing an [`AddressValue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// The text is not of the form `A.B.C.D/P`.
    #[error("invalid network address '{0}': expected A.B.C.D/P")]
    Format(String),
    /// The base address has bits set below the prefix.
    #[error("network address '{0}' has host bits set")]
    Misaligned(String),
    /// A requested child block does not fit in its parent.
    #[error("subnet out of range: {0}")]
    OutOfRange(String),
}

/// An aligned IPv4 network block such as `172.17.0.0/18`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressValue {
    base: u32,
    prefix_length: u8,
}

/// Mask of the bits below `prefix_length`.
fn host_mask(prefix_length: u8) -> u32 {
    u32::MAX.checked_shr(u32::from(prefix_length)).unwrap_or(0)
}

impl AddressValue {
    pub const MAX_PREFIX_LENGTH: u8 = 32;

    /// Build a block from a host-order base address.
    pub fn new(base: u32, prefix_length: u8) -> Result<Self, AddressError> {
        if prefix_length > Self::MAX_PREFIX_LENGTH {
            return Err(AddressError::Format(format!(
                "{}/{prefix_length}",
                Ipv4Addr::from(base)
            )));
        }
        if base & host_mask(prefix_length) != 0 {
            return Err(AddressError::Misaligned(format!(
                "{}/{prefix_length}",
                Ipv4Addr::from(base)
            )));
        }
        Ok(Self {
            base,
            prefix_length,
        })
    }

    /// Parse the canonical `A.B.C.D/P` form.
    ///
    /// Octets are 0–255 and the prefix 0–32, written in plain decimal with no
    /// leading zeros, signs, or whitespace.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let format_error = || AddressError::Format(text.to_string());

        let (addr, prefix) = text.split_once('/').ok_or_else(format_error)?;
        let prefix = parse_decimal(prefix, 2, u32::from(Self::MAX_PREFIX_LENGTH))
            .ok_or_else(format_error)?;

        let mut octets = [0u8; 4];
        let mut parts = addr.split('.');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(format_error)?;
            *octet = parse_decimal(part, 3, 255)
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(format_error)?;
        }
        if parts.next().is_some() {
            return Err(format_error());
        }

        let prefix_length = u8::try_from(prefix).map_err(|_| format_error())?;
        let base = u32::from(Ipv4Addr::from(octets));
        if base & host_mask(prefix_length) != 0 {
            return Err(AddressError::Misaligned(text.to_string()));
        }
        Ok(Self {
            base,
            prefix_length,
        })
    }

    /// Host-order base address.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base)
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_length))
    }

    /// Last address in the block.
    pub fn last(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.base | host_mask(self.prefix_length))
    }

    /// `true` if `other` lies entirely inside this block.
    pub fn contains(&self, other: &AddressValue) -> bool {
        other.prefix_length >= self.prefix_length
            && other.base & !host_mask(self.prefix_length) == self.base
    }

    /// Aligned blocks either nest or are disjoint.
    pub fn overlaps(&self, other: &AddressValue) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// Carve the `index`-th block of length `new_prefix_length` out of this one.
    ///
    /// Blocks are numbered from the base upward. Fails with
    /// [`AddressError::OutOfRange`] when the child would be larger than the
    /// parent or would end past the parent's last address.
    pub fn subdivide(&self, index: u64, new_prefix_length: u8) -> Result<Self, AddressError> {
        let out_of_range = || {
            AddressError::OutOfRange(format!(
                "block {index} of /{new_prefix_length} does not fit in {self}"
            ))
        };

        if new_prefix_length > Self::MAX_PREFIX_LENGTH || new_prefix_length < self.prefix_length {
            return Err(out_of_range());
        }
        let block_size = 1u64 << (32 - u32::from(new_prefix_length));
        let offset = index.checked_mul(block_size).ok_or_else(out_of_range)?;
        let end = offset.checked_add(block_size).ok_or_else(out_of_range)?;
        if end > self.size() {
            return Err(out_of_range());
        }
        let base = u64::from(self.base)
            .checked_add(offset)
            .and_then(|b| u32::try_from(b).ok())
            .ok_or_else(out_of_range)?;

        Ok(Self {
            base,
            prefix_length: new_prefix_length,
        })
    }
}

/// Plain decimal of at most `max_digits` digits, no leading zeros.
fn parse_decimal(text: &str, max_digits: usize, max: u32) -> Option<u32> {
    if text.is_empty() || text.len() > max_digits || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if text.len() > 1 && text.starts_with('0') {
        return None;
    }
    text.parse::<u32>().ok().filter(|n| *n <= max)
}

impl fmt::Display for AddressValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_length)
    }
}

impl FromStr for AddressValue {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for AddressValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AddressValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(de::Error::custom)
    }
}
