pub mod aad;
pub mod aead;
pub mod keys;
pub mod nonce;
pub mod types;

pub use aead::ChunkCipher;
pub use keys::{unwrap_file_key, wrap_file_key, wrap_file_key_with_nonce, FileKey, WrappedFileKey};
pub use types::{CryptoError, NonceError, KEY_LEN_32, NONCE_LEN_12, TAG_LEN_16};
