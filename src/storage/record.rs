//! Serialized shapes of key-store entries.
//!
//! Byte fields are hex strings in JSON.

use crate::crypto::ed25519::{KeyPair, KEY_LENGTH};
use crate::crypto::encryption::{EncryptedKey, IV_LENGTH};
use crate::crypto::password::SALT_LENGTH;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted entry for one alias. Never holds the plaintext private key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredKeyRecord {
    #[serde(with = "hex::serde")]
    pub public_key: [u8; KEY_LENGTH],

    #[serde(with = "hex::serde")]
    pub salt: [u8; SALT_LENGTH],

    #[serde(with = "hex::serde")]
    pub iv: [u8; IV_LENGTH],

    #[serde(with = "hex::serde")]
    pub encrypted_private_key: Vec<u8>,

    pub iterations: u32,
}

impl StoredKeyRecord {
    pub fn new(public_key: [u8; KEY_LENGTH], encrypted: EncryptedKey) -> Self {
        Self {
            public_key,
            salt: encrypted.salt,
            iv: encrypted.iv,
            encrypted_private_key: encrypted.ciphertext,
            iterations: encrypted.iterations,
        }
    }

    pub fn encrypted_key(&self) -> EncryptedKey {
        EncryptedKey {
            salt: self.salt,
            iv: self.iv,
            ciphertext: self.encrypted_private_key.clone(),
            iterations: self.iterations,
        }
    }
}

/// Plaintext key material for an unlocked alias.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UnlockedEntry {
    #[serde(with = "hex::serde")]
    pub public_key: [u8; KEY_LENGTH],

    #[serde(with = "hex::serde")]
    pub private_key: [u8; KEY_LENGTH],
}

impl UnlockedEntry {
    pub fn from_key_pair(key_pair: &KeyPair) -> Self {
        Self {
            public_key: key_pair.public_bytes(),
            private_key: key_pair.private_bytes(),
        }
    }

    pub fn to_key_pair(&self) -> Result<KeyPair> {
        KeyPair::from_parts(&self.private_key, &self.public_key)
    }
}

impl fmt::Debug for UnlockedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedEntry")
            .field("public_key", &hex::encode(self.public_key))
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::encryption::encrypt_private_key;

    #[test]
    fn test_record_json_shape() {
        let key_pair = KeyPair::generate();
        let encrypted = encrypt_private_key(&key_pair.private_bytes(), "pw", 1_000).unwrap();
        let record = StoredKeyRecord::new(key_pair.public_bytes(), encrypted);

        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();

        let mut fields: Vec<&str> = object.keys().map(String::as_str).collect();
        fields.sort();
        assert_eq!(
            fields,
            vec!["encryptedPrivateKey", "iterations", "iv", "publicKey", "salt"]
        );
        assert_eq!(object["publicKey"], key_pair.public_hex());
        assert_eq!(object["iterations"], 1_000);

        let private_hex = hex::encode(key_pair.private_bytes());
        assert!(!json.to_string().contains(&private_hex));
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let key_pair = KeyPair::generate();
        let encrypted = encrypt_private_key(&key_pair.private_bytes(), "pw", 1_000).unwrap();
        let record = StoredKeyRecord::new(key_pair.public_bytes(), encrypted.clone());

        let text = serde_json::to_string(&record).unwrap();
        let parsed: StoredKeyRecord = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed, record);
        assert_eq!(parsed.encrypted_key(), encrypted);
    }

    #[test]
    fn test_unlocked_entry_roundtrip() {
        let key_pair = KeyPair::generate();
        let entry = UnlockedEntry::from_key_pair(&key_pair);
        assert_eq!(entry.to_key_pair().unwrap(), key_pair);
        assert!(format!("{:?}", entry).contains("REDACTED"));
    }
}
