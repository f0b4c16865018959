//! Wipe-on-drop storage for shared secrets and content encryption keys.

use std::fmt;
use zeroize::Zeroizing;

/// Owned key material that is overwritten with zeros when dropped.
///
/// Shared secrets and CEKs only ever live inside this type. `Debug` prints
/// the length only.
pub struct SecretBytes(Zeroizing<Vec<u8>>);

impl SecretBytes {
    /// Takes ownership of `bytes`
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Copies `bytes` into a new zeroizing buffer
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Allocates an empty buffer with room for `capacity` bytes
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self::new(Vec::with_capacity(capacity))
    }

    pub(crate) fn extend_from_slice(&mut self, bytes: &[u8]) {
        // Growing past capacity would leave an unwiped copy behind.
        debug_assert!(self.0.len() + bytes.len() <= self.0.capacity());
        self.0.extend_from_slice(bytes);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        use zeroize::Zeroize;
        if len < self.0.len() {
            self.0[len..].zeroize();
        }
        self.0.truncate(len);
    }

    /// Borrows the secret bytes
    pub fn expose(&self) -> &[u8] {
        &self.0
    }

    /// Number of bytes held
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no bytes are held
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBytes([REDACTED; {}])", self.0.len())
    }
}
