//! WeCom callback message envelope.
//!
//! Layout of the plaintext before encryption:
//!
//! ```text
//! random(16) | msg_len (u32, big endian) | msg | receive_id
//! ```
//!
//! padded PKCS#7-style to a multiple of 32 bytes and encrypted with
//! AES-256-CBC. The key is `base64(EncodingAESKey + "=")`, the IV its first
//! 16 bytes.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use base64::alphabet;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use cbc::cipher::block_padding::NoPadding;
use rand::Rng;

use super::decode_base64;
use crate::error::WechatError;

type Aes256CbcEncryptor = cbc::Encryptor<Aes256>;
type Aes256CbcDecryptor = cbc::Decryptor<Aes256>;

const ENCODING_AES_KEY_LEN: usize = 43;
const PAD_BLOCK: usize = 32;
const RANDOM_PREFIX: usize = 16;

/// A decrypted callback payload and the corp/app id it was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedMessage {
    pub message: String,
    pub receive_id: String,
}

#[derive(Clone)]
pub struct MessageCrypt {
    key: [u8; 32],
    receive_id: String,
}

impl std::fmt::Debug for MessageCrypt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageCrypt")
            .field("receive_id", &self.receive_id)
            .finish_non_exhaustive()
    }
}

impl MessageCrypt {
    /// # Errors
    /// `WechatError::Crypto` when `encoding_aes_key` is not a 43-character
    /// base64 string decoding to 32 bytes.
    pub fn new(encoding_aes_key: &str, receive_id: impl Into<String>) -> Result<Self, WechatError> {
        if encoding_aes_key.len() != ENCODING_AES_KEY_LEN {
            return Err(WechatError::Crypto(format!(
                "EncodingAESKey must be {} characters, got {}",
                ENCODING_AES_KEY_LEN,
                encoding_aes_key.len()
            )));
        }

        // Generated keys do not always leave the trailing bits zeroed.
        let engine = GeneralPurpose::new(
            &alphabet::STANDARD,
            GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
        );
        let decoded = engine
            .decode(format!("{encoding_aes_key}="))
            .map_err(|e| WechatError::Crypto(format!("Invalid EncodingAESKey: {e}")))?;

        let key: [u8; 32] = decoded.try_into().map_err(|bytes: Vec<u8>| {
            WechatError::Crypto(format!(
                "EncodingAESKey must decode to 32 bytes, got {}",
                bytes.len()
            ))
        })?;

        Ok(Self {
            key,
            receive_id: receive_id.into(),
        })
    }

    pub fn receive_id(&self) -> &str {
        &self.receive_id
    }

    /// Decrypt a base64 envelope.
    ///
    /// # Errors
    /// `WechatError::Crypto` for malformed input, `WechatError::Signature`
    /// when the envelope names a different receive id.
    pub fn decrypt(&self, encrypted: &str) -> Result<DecryptedMessage, WechatError> {
        let mut buffer = decode_base64("encrypted message", encrypted)?;
        if buffer.is_empty() || buffer.len() % 16 != 0 {
            return Err(WechatError::Crypto(
                "encrypted message is not block aligned".to_string(),
            ));
        }

        let plaintext = Aes256CbcDecryptor::new(self.key.as_slice().into(), self.key[..16].into())
            .decrypt_padded_mut::<NoPadding>(&mut buffer)
            .map_err(|e| WechatError::Crypto(format!("Decryption failed: {e:?}")))?;
        let content = unpad(plaintext)?;

        if content.len() < RANDOM_PREFIX + 4 {
            return Err(WechatError::Crypto("decrypted message too short".to_string()));
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&content[RANDOM_PREFIX..RANDOM_PREFIX + 4]);
        let msg_len = u32::from_be_bytes(len_bytes) as usize;

        let msg_start = RANDOM_PREFIX + 4;
        let msg_end = msg_start
            .checked_add(msg_len)
            .filter(|end| *end <= content.len())
            .ok_or_else(|| WechatError::Crypto("message length out of range".to_string()))?;

        let message = String::from_utf8(content[msg_start..msg_end].to_vec())
            .map_err(|e| WechatError::Crypto(format!("Invalid UTF-8: {e}")))?;
        let receive_id = String::from_utf8(content[msg_end..].to_vec())
            .map_err(|e| WechatError::Crypto(format!("Invalid UTF-8: {e}")))?;

        if !self.receive_id.is_empty() && receive_id != self.receive_id {
            return Err(WechatError::Signature(format!(
                "receive id mismatch: expected {}, got {}",
                self.receive_id, receive_id
            )));
        }

        Ok(DecryptedMessage {
            message,
            receive_id,
        })
    }

    /// Encrypt `message` for a passive reply, returning base64.
    pub fn encrypt(&self, message: &str) -> Result<String, WechatError> {
        self.encrypt_with_prefix(&random_prefix(), message)
    }

    fn encrypt_with_prefix(
        &self,
        prefix: &[u8; RANDOM_PREFIX],
        message: &str,
    ) -> Result<String, WechatError> {
        let msg_len = u32::try_from(message.len())
            .map_err(|_| WechatError::Crypto("message too large".to_string()))?;

        let mut buffer =
            Vec::with_capacity(RANDOM_PREFIX + 4 + message.len() + self.receive_id.len() + PAD_BLOCK);
        buffer.extend_from_slice(prefix);
        buffer.extend_from_slice(&msg_len.to_be_bytes());
        buffer.extend_from_slice(message.as_bytes());
        buffer.extend_from_slice(self.receive_id.as_bytes());

        let pad = PAD_BLOCK - buffer.len() % PAD_BLOCK;
        buffer.resize(buffer.len() + pad, pad as u8);

        let len = buffer.len();
        let encrypted = Aes256CbcEncryptor::new(self.key.as_slice().into(), self.key[..16].into())
            .encrypt_padded_mut::<NoPadding>(&mut buffer, len)
            .map_err(|e| WechatError::Crypto(format!("Encryption failed: {e:?}")))?;

        Ok(BASE64.encode(encrypted))
    }
}

fn unpad(plaintext: &[u8]) -> Result<&[u8], WechatError> {
    let pad = plaintext.last().copied().unwrap_or(0) as usize;
    if pad == 0 || pad > PAD_BLOCK || pad > plaintext.len() {
        return Err(WechatError::Crypto("invalid padding".to_string()));
    }
    Ok(&plaintext[..plaintext.len() - pad])
}

fn random_prefix() -> [u8; RANDOM_PREFIX] {
    let mut prefix = [0u8; RANDOM_PREFIX];
    rand::rng().fill(&mut prefix);
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    const AES_KEY: &str = "abcdefghijklmnopqrstuvwxyz0123456789ABCDEFG";

    #[test]
    fn test_key_length_is_checked() {
        assert!(matches!(
            MessageCrypt::new("short", "ww1"),
            Err(WechatError::Crypto(_))
        ));
        assert!(MessageCrypt::new(AES_KEY, "ww1").is_ok());
    }

    #[test]
    fn test_encrypt_then_decrypt() {
        let crypt = MessageCrypt::new(AES_KEY, "ww1234567890").unwrap();
        let xml = "<xml><Content><![CDATA[hello]]></Content></xml>";

        let encrypted = crypt.encrypt(xml).unwrap();
        let decrypted = crypt.decrypt(&encrypted).unwrap();

        assert_eq!(decrypted.message, xml);
        assert_eq!(decrypted.receive_id, "ww1234567890");
    }

    #[test]
    fn test_fixed_prefix_is_deterministic() {
        let crypt = MessageCrypt::new(AES_KEY, "ww1").unwrap();
        let prefix = [7u8; RANDOM_PREFIX];
        assert_eq!(
            crypt.encrypt_with_prefix(&prefix, "echo").unwrap(),
            crypt.encrypt_with_prefix(&prefix, "echo").unwrap()
        );
    }

    #[test]
    fn test_encrypt_uses_fresh_prefix() {
        let crypt = MessageCrypt::new(AES_KEY, "ww1").unwrap();
        let first = crypt.encrypt("echo").unwrap();
        let second = crypt.encrypt("echo").unwrap();

        assert_ne!(first, second);
        assert_ne!(random_prefix(), random_prefix());
        assert_eq!(crypt.decrypt(&first).unwrap().message, "echo");
        assert_eq!(crypt.decrypt(&second).unwrap().message, "echo");
    }

    #[test]
    fn test_receive_id_mismatch() {
        let sender = MessageCrypt::new(AES_KEY, "ww_other").unwrap();
        let receiver = MessageCrypt::new(AES_KEY, "ww_mine").unwrap();

        let encrypted = sender.encrypt("hello").unwrap();
        assert!(matches!(
            receiver.decrypt(&encrypted),
            Err(WechatError::Signature(_))
        ));
    }

    #[test]
    fn test_empty_receive_id_accepts_any() {
        let sender = MessageCrypt::new(AES_KEY, "ww_other").unwrap();
        let receiver = MessageCrypt::new(AES_KEY, "").unwrap();

        let decrypted = receiver.decrypt(&sender.encrypt("hello").unwrap()).unwrap();
        assert_eq!(decrypted.receive_id, "ww_other");
    }

    #[test]
    fn test_garbage_is_rejected() {
        let crypt = MessageCrypt::new(AES_KEY, "ww1").unwrap();
        assert!(crypt.decrypt("not base64!!").is_err());
        assert!(crypt.decrypt(&BASE64.encode([1u8; 5])).is_err());
    }

    #[test]
    fn test_unpad() {
        assert_eq!(unpad(&[1, 2, 3, 2, 2]).unwrap(), &[1, 2, 3]);
        assert!(unpad(&[1, 0]).is_err());
        assert!(unpad(&[33]).is_err());
    }
}
