//! Record state and serialization.

use crate::config::ChainConfig;
use crate::error::{CoreError, CoreResult};
use crate::types::{OutPoint, Script, Txid, UpdateOp};

/// Maximum size of a variable-length field in the record encoding.
///
/// The layout uses 4-byte length prefixes, so values and scripts beyond
/// this cannot be framed correctly and are rejected at encode time.
pub const MAX_FIELD_SIZE: usize = u32::MAX as usize;

/// State of one record as of its last update.
///
/// Immutable value object: a new update produces a new record rather than
/// mutating an existing one. Equality is structural over all four fields.
///
/// # Serialized Layout
///
/// Consumed by and produced for the persistent store:
///
/// ```text
/// value_len (u32 LE) + value
/// height    (u32 LE)
/// txid      (32 bytes) + output index (u32 LE)
/// addr_len  (u32 LE) + address script
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    value: Vec<u8>,
    height: u32,
    outpoint: OutPoint,
    address: Script,
}

impl NameRecord {
    /// Creates a record from its four fields.
    pub fn new(
        value: impl Into<Vec<u8>>,
        height: u32,
        outpoint: OutPoint,
        address: impl Into<Script>,
    ) -> Self {
        Self {
            value: value.into(),
            height,
            outpoint,
            address: address.into(),
        }
    }

    /// Creates a record from a decoded update operation.
    ///
    /// The value and address come from the operation's payload; the height
    /// and outpoint come from the processing context of the transaction
    /// that carried it.
    pub fn from_operation(height: u32, outpoint: OutPoint, op: &UpdateOp) -> Self {
        Self {
            value: op.value.clone(),
            height,
            outpoint,
            address: op.address.clone(),
        }
    }

    /// Returns the record's value.
    #[must_use]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns the height of the record's last update.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the outpoint of the transaction output that produced this
    /// record's current state.
    #[must_use]
    pub fn outpoint(&self) -> &OutPoint {
        &self.outpoint
    }

    /// Returns the owning address script.
    #[must_use]
    pub fn address(&self) -> &[u8] {
        &self.address
    }

    /// Checks whether the record is expired at the given chain height.
    ///
    /// A record expires once more than `config.expiration_depth()` height
    /// units have passed since its last update; exactly the expiration
    /// depth is still live. Heights below the record's own never expire it.
    #[must_use]
    pub fn is_expired_at(&self, height: u32, config: &ChainConfig) -> bool {
        match height.checked_sub(self.height) {
            Some(age) => age > config.expiration_depth(),
            None => false,
        }
    }

    /// Serializes the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the value or address exceeds [`MAX_FIELD_SIZE`].
    pub fn encode(&self) -> CoreResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Serializes the record, appending to `buf`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value or address exceeds [`MAX_FIELD_SIZE`].
    pub fn encode_into(&self, buf: &mut Vec<u8>) -> CoreResult<()> {
        write_bytes(buf, &self.value, "value")?;
        buf.extend_from_slice(&self.height.to_le_bytes());
        buf.extend_from_slice(self.outpoint.txid.as_bytes());
        buf.extend_from_slice(&self.outpoint.index.to_le_bytes());
        write_bytes(buf, &self.address, "address")?;
        Ok(())
    }

    /// Deserializes a record, rejecting trailing bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Corrupted`] if the payload is truncated or has
    /// trailing bytes.
    pub fn decode(payload: &[u8]) -> CoreResult<Self> {
        let mut cursor = 0;
        let record = Self::decode_from(payload, &mut cursor)?;
        if cursor != payload.len() {
            return Err(CoreError::corrupted(format!(
                "trailing bytes in record: expected {} bytes, got {}",
                cursor,
                payload.len()
            )));
        }
        Ok(record)
    }

    /// Deserializes one record starting at `cursor`, advancing it past the
    /// consumed bytes. Used for sequential decoding of history stacks.
    pub(crate) fn decode_from(payload: &[u8], cursor: &mut usize) -> CoreResult<Self> {
        let value = read_bytes(payload, cursor)?;
        let height = read_u32(payload, cursor)?;
        let txid = Txid::new(read_array::<32>(payload, cursor)?);
        let index = read_u32(payload, cursor)?;
        let address = read_bytes(payload, cursor)?;
        Ok(Self {
            value,
            height,
            outpoint: OutPoint::new(txid, index),
            address,
        })
    }
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8], field: &str) -> CoreResult<()> {
    if bytes.len() > MAX_FIELD_SIZE {
        return Err(CoreError::encoding_limit(format!(
            "{field} too large: {} bytes exceeds maximum of {MAX_FIELD_SIZE} bytes",
            bytes.len()
        )));
    }
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn read_u32(payload: &[u8], cursor: &mut usize) -> CoreResult<u32> {
    let bytes = read_array::<4>(payload, cursor)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_array<const N: usize>(payload: &[u8], cursor: &mut usize) -> CoreResult<[u8; N]> {
    let end = cursor
        .checked_add(N)
        .filter(|end| *end <= payload.len())
        .ok_or_else(|| CoreError::corrupted("unexpected end of payload"))?;
    let bytes: [u8; N] = payload[*cursor..end]
        .try_into()
        .map_err(|_| CoreError::corrupted("invalid fixed-width field"))?;
    *cursor = end;
    Ok(bytes)
}

fn read_bytes(payload: &[u8], cursor: &mut usize) -> CoreResult<Vec<u8>> {
    let len = read_u32(payload, cursor)? as usize;
    let end = cursor
        .checked_add(len)
        .filter(|end| *end <= payload.len())
        .ok_or_else(|| CoreError::corrupted("unexpected end of byte string"))?;
    let bytes = payload[*cursor..end].to_vec();
    *cursor = end;
    Ok(bytes)
}
