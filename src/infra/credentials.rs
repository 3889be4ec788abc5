//! Transport codec for credentials sent by the web front end.
//!
//! AES-256-CBC with PKCS#7 padding under a fixed key and IV shared with the
//! front end. Ciphertext travels as hex or base64.

use std::fmt;
use std::str::FromStr;

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialEncoding {
    #[default]
    Hex,
    Base64,
}

impl CredentialEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hex => "hex",
            Self::Base64 => "base64",
        }
    }
}

impl FromStr for CredentialEncoding {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hex" => Ok(Self::Hex),
            "base64" => Ok(Self::Base64),
            other => Err(format!("unknown credential encoding `{other}`")),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("secret key must be {KEY_LEN} bytes, got {0}")]
    KeyLength(usize),
    #[error("secret buffer must be {IV_LEN} bytes, got {0}")]
    IvLength(usize),
    #[error("credential is not valid {0}")]
    Encoding(&'static str),
    #[error("credential could not be decrypted")]
    Decrypt,
    #[error("decrypted credential is not valid UTF-8")]
    Utf8,
}

#[derive(Clone)]
pub struct CredentialCodec {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
    encoding: CredentialEncoding,
}

impl CredentialCodec {
    pub fn new(
        secret_key: &str,
        secret_buffer: &str,
        encoding: CredentialEncoding,
    ) -> Result<Self, CredentialError> {
        let key: [u8; KEY_LEN] = secret_key
            .as_bytes()
            .try_into()
            .map_err(|_| CredentialError::KeyLength(secret_key.len()))?;
        let iv: [u8; IV_LEN] = secret_buffer
            .as_bytes()
            .try_into()
            .map_err(|_| CredentialError::IvLength(secret_buffer.len()))?;
        Ok(Self { key, iv, encoding })
    }

    /// Decrypt a transport-encoded credential into plaintext.
    pub fn decode(&self, encoded: &str) -> Result<String, CredentialError> {
        let encoded = encoded.trim();
        let ciphertext = match self.encoding {
            CredentialEncoding::Hex => hex::decode(encoded)
                .map_err(|_| CredentialError::Encoding(self.encoding.as_str()))?,
            CredentialEncoding::Base64 => STANDARD
                .decode(encoded)
                .map_err(|_| CredentialError::Encoding(self.encoding.as_str()))?,
        };

        let plaintext = Aes256CbcDec::new_from_slices(&self.key, &self.iv)
            .map_err(|_| CredentialError::Decrypt)?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| CredentialError::Decrypt)?;

        String::from_utf8(plaintext).map_err(|_| CredentialError::Utf8)
    }

    /// Encrypt plaintext the way the front end does.
    pub fn encode(&self, plaintext: &str) -> Result<String, CredentialError> {
        let ciphertext = Aes256CbcEnc::new_from_slices(&self.key, &self.iv)
            .map_err(|_| CredentialError::Decrypt)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        Ok(match self.encoding {
            CredentialEncoding::Hex => hex::encode(ciphertext),
            CredentialEncoding::Base64 => STANDARD.encode(ciphertext),
        })
    }
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .field("encoding", &self.encoding)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";
    const IV: &str = "fedcba9876543210";

    fn codec(encoding: CredentialEncoding) -> CredentialCodec {
        CredentialCodec::new(KEY, IV, encoding).expect("valid key material")
    }

    #[test]
    fn decodes_known_hex_ciphertext() {
        let plaintext = codec(CredentialEncoding::Hex)
            .decode("998afd63a1d8319cc9320762a555cab8e5dfa506b319af68d548a5aa6fd6707e")
            .expect("decodes");
        assert_eq!(plaintext, "reader@example.com");
    }

    #[test]
    fn decodes_known_base64_ciphertext() {
        let plaintext = codec(CredentialEncoding::Base64)
            .decode("mYr9Y6HYMZzJMgdipVXKuOXfpQazGa9o1Uilqm/WcH4=")
            .expect("decodes");
        assert_eq!(plaintext, "reader@example.com");
    }

    #[test]
    fn encode_matches_front_end_output() {
        let encoded = codec(CredentialEncoding::Hex)
            .encode("hunter2")
            .expect("encodes");
        assert_eq!(encoded, "0207328a4cb51eaf64bb463c5664a24a");
    }

    #[test]
    fn rejects_wrong_key_material() {
        assert_eq!(
            CredentialCodec::new("short", IV, CredentialEncoding::Hex).unwrap_err(),
            CredentialError::KeyLength(5)
        );
        assert_eq!(
            CredentialCodec::new(KEY, "short", CredentialEncoding::Hex).unwrap_err(),
            CredentialError::IvLength(5)
        );
    }

    #[test]
    fn rejects_malformed_input() {
        let codec = codec(CredentialEncoding::Hex);
        assert_eq!(
            codec.decode("not hex").unwrap_err(),
            CredentialError::Encoding("hex")
        );
        assert_eq!(
            codec.decode("00112233").unwrap_err(),
            CredentialError::Decrypt
        );
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!("HEX".parse::<CredentialEncoding>(), Ok(CredentialEncoding::Hex));
        assert_eq!(
            " base64 ".parse::<CredentialEncoding>(),
            Ok(CredentialEncoding::Base64)
        );
        assert!("rot13".parse::<CredentialEncoding>().is_err());
    }
}
