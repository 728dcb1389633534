//! Fixed-capacity byte buffers for proxy hosts and credentials.

use std::fmt;
use std::ptr;
use std::sync::atomic::{Ordering, compiler_fence};

use crate::ClientError;

/// Maximum number of usable bytes in a [`BoundedBuf`].
pub const MAX_CREDENTIAL_LEN: usize = 255;

/// An owned, inline byte buffer holding at most [`MAX_CREDENTIAL_LEN`]
/// bytes.
///
/// The contents are zeroed by [`clear`](Self::clear) and again on drop.
/// `Debug` prints only the length.
pub struct BoundedBuf {
    bytes: [u8; MAX_CREDENTIAL_LEN],
    len: u8,
}

impl BoundedBuf {
    /// An empty buffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0; MAX_CREDENTIAL_LEN],
            len: 0,
        }
    }

    /// Copies `value` into a new buffer.
    ///
    /// # Errors
    /// Returns [`ClientError::CredentialTooLong`] naming `field` if
    /// `value` is longer than [`MAX_CREDENTIAL_LEN`] bytes. Nothing is
    /// copied in that case.
    pub fn try_new(field: &'static str, value: &str) -> Result<Self, ClientError> {
        let len = u8::try_from(value.len()).map_err(|_| {
            ClientError::CredentialTooLong {
                field,
                len: value.len(),
            }
        })?;

        let mut buf = Self::new();
        buf.bytes[..value.len()].copy_from_slice(value.as_bytes());
        buf.len = len;
        Ok(buf)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..usize::from(self.len)]
    }

    /// The contents as text. Always valid, since buffers are only built
    /// from `&str`.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Zeroes the whole backing array and empties the buffer.
    ///
    /// The stores are volatile, so they survive even when the buffer is
    /// freed right after.
    pub fn clear(&mut self) {
        wipe_bytes(&mut self.bytes);
        self.len = 0;
    }

    #[cfg(test)]
    pub(crate) fn backing(&self) -> &[u8; MAX_CREDENTIAL_LEN] {
        &self.bytes
    }
}

/// Zeroes `text` in place and leaves it empty.
pub(crate) fn wipe_string(text: &mut String) {
    let mut bytes = std::mem::take(text).into_bytes();
    wipe_bytes(&mut bytes);
}

fn wipe_bytes(bytes: &mut [u8]) {
    for byte in bytes.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, exclusive reference.
        unsafe { ptr::write_volatile(byte, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

impl Default for BoundedBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BoundedBuf {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BoundedBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedBuf").field("len", &self.len).finish()
    }
}
