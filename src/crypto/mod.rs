//! Payload ciphers
//!
//! - [`user_data`] - AES-128-CBC decryption of Mini Program user data
//!   (phone numbers, share info) keyed by the login `session_key`
//! - [`message`] - the AES-256-CBC envelope WeCom uses for callback
//!   bodies, keyed by the 43-character `EncodingAESKey`
//!
//! Both keep secrets out of error messages.

pub mod message;
pub mod user_data;

pub use message::{DecryptedMessage, MessageCrypt};
pub use user_data::{decrypt_user_data, verify_watermark, DecryptedUserData, Watermark};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::WechatError;

fn decode_base64(field: &str, value: &str) -> Result<Vec<u8>, WechatError> {
    BASE64
        .decode(value)
        .map_err(|e| WechatError::Crypto(format!("Invalid {field}: {e}")))
}
