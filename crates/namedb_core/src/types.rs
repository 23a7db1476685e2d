//! Core type definitions for namedb.

use std::fmt;

/// Encoded owner script bytes.
pub type Script = Vec<u8>;

/// Transaction identifier (32 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    /// Creates a transaction id from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Reference to a specific transaction output.
///
/// Each record carries the outpoint of the transaction output that most
/// recently produced its current state, for provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutPoint {
    /// Transaction the output belongs to.
    pub txid: Txid,
    /// Index of the output within the transaction.
    pub index: u32,
}

impl OutPoint {
    /// Creates an outpoint.
    #[must_use]
    pub const fn new(txid: Txid, index: u32) -> Self {
        Self { txid, index }
    }
}

impl fmt::Display for OutPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.index)
    }
}

/// Decoded payload of a validated registry update operation.
///
/// Script interpretation (outside this layer) decides that an update is
/// legal and hands over the resulting value and owner script; the height
/// and outpoint come from the surrounding processing context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOp {
    /// The record's new value.
    pub value: Vec<u8>,
    /// The owning address script.
    pub address: Script,
}

impl UpdateOp {
    /// Creates an update operation payload.
    pub fn new(value: impl Into<Vec<u8>>, address: impl Into<Script>) -> Self {
        Self {
            value: value.into(),
            address: address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txid_displays_as_hex() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xde;
        bytes[1] = 0xad;
        let txid = Txid::new(bytes);
        assert!(format!("{txid}").starts_with("dead"));
        assert_eq!(format!("{txid}").len(), 64);
    }

    #[test]
    fn outpoint_display() {
        let outpoint = OutPoint::new(Txid::new([0; 32]), 7);
        assert!(format!("{outpoint}").ends_with(":7"));
    }
}
