//! Chain parameters supplied by the embedding node.

/// Protocol parameters this layer needs from the surrounding node.
///
/// The core does not own chain state; the embedder constructs this from its
/// consensus parameters and passes it wherever expiry is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainConfig {
    /// Number of height units after which an unrenewed record is expired.
    expiration_depth: u32,
}

impl ChainConfig {
    /// Creates a configuration with the given expiration depth.
    #[must_use]
    pub const fn new(expiration_depth: u32) -> Self {
        Self { expiration_depth }
    }

    /// Returns the configured expiration depth.
    #[must_use]
    pub const fn expiration_depth(self) -> u32 {
        self.expiration_depth
    }
}
