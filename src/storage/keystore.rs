//! Keystore implementation for managing encrypted keys.
//!
//! Two independent tiers:
//!
//! - **persisted**: one [`StoredKeyRecord`] per alias, private key sealed with
//!   a password. Safe to keep indefinitely.
//! - **unlocked**: plaintext key pairs for aliases the user has explicitly
//!   unlocked. In memory by default, so it ends with the process at the latest.
//!
//! A wrong password is an expected outcome, not an error: lookups that fail
//! to decrypt return `Ok(None)`.

use crate::crypto::ed25519::{KeyPair, KEY_LENGTH};
use crate::crypto::encryption::{decrypt_private_key, encrypt_private_key};
use crate::crypto::password::DEFAULT_ITERATIONS;
use crate::error::{Result, SdkError};
use crate::net::config::ClientConfig;
use crate::signer::KeyPairSigner;
use crate::storage::backend::{FileStorage, KeyStorage, MemoryStorage};
use crate::storage::record::{StoredKeyRecord, UnlockedEntry};
use std::path::Path;
use subtle::ConstantTimeEq;

/// Default keystore filename.
pub const KEYSTORE_FILENAME: &str = "convex_keystore.json";

/// How to find an unlocked key pair.
#[derive(Debug, Clone, Copy)]
pub enum UnlockedLookup<'a> {
    ByAlias(&'a str),
    ByPublicKey(&'a [u8; KEY_LENGTH]),
}

/// A keystore for password-protected Ed25519 keys.
pub struct KeyStore {
    persisted: Box<dyn KeyStorage>,
    unlocked: Box<dyn KeyStorage>,
    iterations: u32,
}

impl KeyStore {
    pub fn new(persisted: Box<dyn KeyStorage>, unlocked: Box<dyn KeyStorage>) -> Self {
        Self {
            persisted,
            unlocked,
            iterations: DEFAULT_ITERATIONS,
        }
    }

    /// Both tiers in memory.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), Box::new(MemoryStorage::new()))
    }

    /// Persisted tier in `directory`, unlocked tier in memory.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use convex_sdk::storage::keystore::KeyStore;
    /// use std::path::Path;
    ///
    /// let keystore = KeyStore::open(Path::new(".")).unwrap();
    /// ```
    pub fn open(directory: &Path) -> Result<Self> {
        let persisted = FileStorage::open(directory, KEYSTORE_FILENAME)?;
        Ok(Self::new(Box::new(persisted), Box::new(MemoryStorage::new())))
    }

    /// Like [`KeyStore::open`], deriving keys with `config.kdf_iterations`.
    pub fn open_with_config(directory: &Path, config: &ClientConfig) -> Result<Self> {
        Ok(Self::open(directory)?.with_iterations(config.kdf_iterations))
    }

    /// PBKDF2 iterations for records stored from now on.
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Encrypt and persist `key_pair` under `alias`, replacing any existing record.
    ///
    /// An unlocked copy of the replaced key is dropped, so the alias has to be
    /// unlocked again before it can sign.
    ///
    /// # Example
    ///
    /// ```
    /// use convex_sdk::crypto::ed25519::KeyPair;
    /// use convex_sdk::storage::keystore::KeyStore;
    ///
    /// # fn example() -> convex_sdk::error::Result<()> {
    /// let mut keystore = KeyStore::in_memory().with_iterations(1_000);
    /// let key_pair = KeyPair::generate();
    ///
    /// keystore.store_key_pair("main", &key_pair, "password")?;
    /// let loaded = keystore.get_key_pair("main", "password")?;
    /// assert_eq!(loaded, Some(key_pair));
    /// # Ok(())
    /// # }
    /// # example().unwrap();
    /// ```
    pub fn store_key_pair(&mut self, alias: &str, key_pair: &KeyPair, password: &str) -> Result<()> {
        check_alias(alias)?;

        let encrypted = encrypt_private_key(&key_pair.private_bytes(), password, self.iterations)?;
        let record = StoredKeyRecord::new(key_pair.public_bytes(), encrypted);

        self.persisted.set(alias, serde_json::to_value(&record)?)?;
        self.unlocked.remove(alias)?;
        tracing::info!(alias, public_key = %key_pair.public_hex(), "stored key pair");
        Ok(())
    }

    /// Decrypt the key pair stored under `alias`.
    ///
    /// Returns `Ok(None)` if the alias is unknown, the password is wrong or
    /// the record is corrupt. Storage failures are still errors.
    pub fn get_key_pair(&self, alias: &str, password: &str) -> Result<Option<KeyPair>> {
        let Some(record) = self.read_record(alias)? else {
            return Ok(None);
        };

        let key_pair = decrypt_private_key(&record.encrypted_key(), password)
            .and_then(|private| KeyPair::from_parts(&private, &record.public_key));

        match key_pair {
            Ok(key_pair) => Ok(Some(key_pair)),
            Err(_) => {
                tracing::warn!(alias, "could not decrypt stored key pair");
                Ok(None)
            }
        }
    }

    /// The stored public key; no password needed.
    pub fn get_public_key(&self, alias: &str) -> Result<Option<[u8; KEY_LENGTH]>> {
        Ok(self.read_record(alias)?.map(|record| record.public_key))
    }

    /// Aliases of all persisted records, sorted.
    pub fn list_aliases(&self) -> Result<Vec<String>> {
        self.persisted.keys()
    }

    /// Remove the record for `alias` and any unlocked copy of it.
    pub fn delete_key_pair(&mut self, alias: &str) -> Result<bool> {
        let existed = self.persisted.remove(alias)?;
        self.unlocked.remove(alias)?;
        if existed {
            tracing::info!(alias, "deleted key pair");
        }
        Ok(existed)
    }

    /// Keep plaintext key material for `alias` in the unlocked tier.
    pub fn store_unlocked_key_pair(&mut self, alias: &str, key_pair: &KeyPair) -> Result<()> {
        check_alias(alias)?;
        let entry = UnlockedEntry::from_key_pair(key_pair);
        self.unlocked.set(alias, serde_json::to_value(&entry)?)
    }

    /// Find an unlocked key pair by alias or by public key.
    ///
    /// Lookup by public key compares against every unlocked entry in constant
    /// time per entry and does not stop at the first match.
    pub fn get_unlocked_key_pair(&self, lookup: UnlockedLookup<'_>) -> Result<Option<KeyPair>> {
        match lookup {
            UnlockedLookup::ByAlias(alias) => self.unlocked_by_alias(alias),
            UnlockedLookup::ByPublicKey(public_key) => {
                let mut found = None;
                for alias in self.unlocked.keys()? {
                    let Some(entry) = self.read_unlocked(&alias)? else {
                        continue;
                    };
                    let matches: bool = entry.public_key.ct_eq(public_key).into();
                    if matches && found.is_none() {
                        found = entry.to_key_pair().ok();
                    }
                }
                Ok(found)
            }
        }
    }

    /// Decrypt `alias` and move it to the unlocked tier.
    ///
    /// Returns `Ok(None)` on a wrong password or unknown alias.
    pub fn unlock(&mut self, alias: &str, password: &str) -> Result<Option<KeyPair>> {
        let Some(key_pair) = self.get_key_pair(alias, password)? else {
            return Ok(None);
        };
        self.store_unlocked_key_pair(alias, &key_pair)?;
        tracing::debug!(alias, "unlocked key pair");
        Ok(Some(key_pair))
    }

    pub fn lock(&mut self, alias: &str) -> Result<()> {
        if self.unlocked.remove(alias)? {
            tracing::debug!(alias, "locked key pair");
        }
        Ok(())
    }

    /// Whether `alias` has a usable unlocked key pair.
    pub fn is_unlocked(&self, alias: &str) -> Result<bool> {
        Ok(self.unlocked_by_alias(alias)?.is_some())
    }

    /// Lock every alias. The persisted tier is untouched.
    pub fn clear_unlocked_key_pairs(&mut self) -> Result<()> {
        self.unlocked.clear()
    }

    /// A signer for an unlocked alias.
    pub fn signer(&self, alias: &str) -> Result<Option<KeyPairSigner>> {
        Ok(self
            .get_unlocked_key_pair(UnlockedLookup::ByAlias(alias))?
            .map(KeyPairSigner::new))
    }

    fn read_record(&self, alias: &str) -> Result<Option<StoredKeyRecord>> {
        let Some(raw) = self.persisted.get(alias)? else {
            return Ok(None);
        };
        match serde_json::from_value(raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(alias, error = %e, "ignoring unreadable key record");
                Ok(None)
            }
        }
    }

    fn read_unlocked(&self, alias: &str) -> Result<Option<UnlockedEntry>> {
        Ok(self
            .unlocked
            .get(alias)?
            .and_then(|raw| serde_json::from_value(raw).ok()))
    }

    fn unlocked_by_alias(&self, alias: &str) -> Result<Option<KeyPair>> {
        Ok(self
            .read_unlocked(alias)?
            .and_then(|entry| entry.to_key_pair().ok()))
    }
}

fn check_alias(alias: &str) -> Result<()> {
    if alias.trim().is_empty() {
        return Err(SdkError::Keystore("Alias must not be empty".to_string()));
    }
    Ok(())
}
