use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Generator for opaque bearer tokens (refresh and password-reset tokens).
///
/// Draws bytes from the operating system CSPRNG and encodes them as
/// unpadded base64url, so values are safe in URLs and form fields.
#[derive(Debug, Clone, Copy)]
pub struct TokenGenerator {
    byte_length: usize,
}

impl TokenGenerator {
    /// 256 bits of entropy.
    pub const DEFAULT_BYTE_LENGTH: usize = 32;

    /// Smallest length accepted by `with_byte_length` (128 bits).
    pub const MIN_BYTE_LENGTH: usize = 16;

    pub fn new() -> Self {
        Self {
            byte_length: Self::DEFAULT_BYTE_LENGTH,
        }
    }

    /// Use `byte_length` random bytes per token, never fewer than
    /// `MIN_BYTE_LENGTH`.
    pub fn with_byte_length(byte_length: usize) -> Self {
        Self {
            byte_length: byte_length.max(Self::MIN_BYTE_LENGTH),
        }
    }

    pub fn generate(&self) -> String {
        let mut bytes = vec![0u8; self.byte_length];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new()
    }
}
