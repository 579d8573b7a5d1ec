//! AES-128-CBC decryption for Mini Program encrypted user data

use aes::cipher::{BlockDecryptMut, KeyIvInit};
use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::Decryptor;
use serde::Deserialize;

use super::decode_base64;
use crate::error::WechatError;

type Aes128CbcDecryptor = Decryptor<Aes128>;

/// Decrypted user data with watermark
#[derive(Debug, Clone, Deserialize)]
pub struct DecryptedUserData {
    /// Scenario-specific fields (phoneNumber, openGId, ...)
    #[serde(flatten)]
    pub data: serde_json::Value,
    pub watermark: Watermark,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Watermark {
    /// Unix timestamp of the encryption
    pub timestamp: i64,
    /// AppID that encrypted the data
    pub appid: String,
}

/// Decrypt Mini Program encrypted user data.
///
/// Key is the base64 `session_key` (16 bytes), IV the base64 `iv` sent by
/// the client (16 bytes), and the plaintext a JSON document carrying a
/// `watermark`.
pub fn decrypt_user_data(
    session_key: &str,
    encrypted_data: &str,
    iv: &str,
) -> Result<DecryptedUserData, WechatError> {
    let key = decode_base64("session_key", session_key)?;
    let mut buffer = decode_base64("encrypted_data", encrypted_data)?;
    let iv = decode_base64("iv", iv)?;

    if key.len() != 16 {
        return Err(WechatError::Crypto(format!(
            "Invalid key length: expected 16, got {}",
            key.len()
        )));
    }
    if iv.len() != 16 {
        return Err(WechatError::Crypto(format!(
            "Invalid IV length: expected 16, got {}",
            iv.len()
        )));
    }

    let plaintext = Aes128CbcDecryptor::new(key.as_slice().into(), iv.as_slice().into())
        .decrypt_padded_mut::<Pkcs7>(&mut buffer)
        .map_err(|e| WechatError::Crypto(format!("Decryption failed: {e:?}")))?;

    serde_json::from_slice(plaintext)
        .map_err(|e| WechatError::Crypto(format!("Invalid JSON: {e}")))
}

/// Check that the watermark names the expected app.
pub fn verify_watermark(data: &DecryptedUserData, expected_appid: &str) -> Result<(), WechatError> {
    if data.watermark.appid != expected_appid {
        return Err(WechatError::Signature(format!(
            "Watermark appid mismatch: expected {}, got {}",
            expected_appid, data.watermark.appid
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockEncryptMut;
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

    const KEY: [u8; 16] = *b"0123456789abcdef";
    const IV: [u8; 16] = *b"fedcba9876543210";

    fn encrypt(plaintext: &str) -> String {
        let mut buffer = plaintext.as_bytes().to_vec();
        let len = buffer.len();
        buffer.resize(len + 16, 0);
        let encrypted = cbc::Encryptor::<Aes128>::new((&KEY).into(), (&IV).into())
            .encrypt_padded_mut::<Pkcs7>(&mut buffer, len)
            .unwrap();
        BASE64.encode(encrypted)
    }

    #[test]
    fn test_decrypt_and_verify() {
        let encrypted = encrypt(
            r#"{"phoneNumber":"13800000000","watermark":{"timestamp":1700000000,"appid":"wx1234567890abcdef"}}"#,
        );

        let data = decrypt_user_data(&BASE64.encode(KEY), &encrypted, &BASE64.encode(IV)).unwrap();
        assert_eq!(data.data["phoneNumber"], "13800000000");
        assert_eq!(data.watermark.timestamp, 1700000000);
        assert!(verify_watermark(&data, "wx1234567890abcdef").is_ok());
        assert!(matches!(
            verify_watermark(&data, "wx0000000000000000"),
            Err(WechatError::Signature(_))
        ));
    }

    #[test]
    fn test_invalid_base64_session_key() {
        let result = decrypt_user_data("not-valid-base64!!!", "data", "iv");
        assert!(matches!(result, Err(WechatError::Crypto(m)) if m.contains("session_key")));
    }

    #[test]
    fn test_invalid_key_length() {
        let result = decrypt_user_data(
            &BASE64.encode(b"short"),
            &encrypt("{}"),
            &BASE64.encode(IV),
        );
        assert!(matches!(result, Err(WechatError::Crypto(m)) if m.contains("key length")));
    }

    #[test]
    fn test_wrong_key_fails() {
        let result = decrypt_user_data(
            &BASE64.encode(b"ffffffffffffffff"),
            &encrypt(r#"{"watermark":{"timestamp":1,"appid":"wx"}}"#),
            &BASE64.encode(IV),
        );
        assert!(result.is_err());
    }
}
