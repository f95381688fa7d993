use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_KEY_LENGTH: usize = 512;
pub const MAX_VALUE_SIZE: usize = 10 * 1024 * 1024;

/// Storage key validated against the platform key-value store's constraints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KvKey(String);

impl KvKey {
    pub fn new(key: impl Into<String>) -> Result<Self, KvError> {
        let key = key.into();

        if key.trim().is_empty() {
            return Err(KvError::InvalidKey {
                key,
                reason: "key cannot be empty".to_string(),
            });
        }

        if key.len() > MAX_KEY_LENGTH {
            return Err(KvError::InvalidKey {
                key: key.chars().take(50).collect::<String>() + "...",
                reason: format!("key exceeds maximum length of {MAX_KEY_LENGTH} bytes"),
            });
        }

        if key.contains('\0') || key.contains("..") {
            return Err(KvError::InvalidKey {
                key: key.replace('\0', "\\0"),
                reason: "key contains forbidden characters".to_string(),
            });
        }

        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOperation {
    Get { key: KvKey },
    Set { key: KvKey, value: Vec<u8> },
}

impl Operation for KvOperation {
    type Output = KvResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KvOutput {
    Get { value: Option<Vec<u8>> },
    Set,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },

    #[error("storage read failed: {message}")]
    ReadFailed { message: String },

    #[error("storage write failed: {message}")]
    WriteFailed { message: String },
}

pub type KvResult = Result<KvOutput, KvError>;

/// Key-value storage capability. The shell owns the actual storage medium
/// (SQLite, UserDefaults, SharedPreferences); the core only sees bytes.
pub struct Kv<E> {
    context: CapabilityContext<KvOperation, E>,
}

impl<Ev> Capability<Ev> for Kv<Ev> {
    type Operation = KvOperation;
    type MappedSelf<MappedEv> = Kv<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + Copy + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Kv::new(self.context.map_event(f))
    }
}

impl<E> Kv<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<KvOperation, E>) -> Self {
        Self { context }
    }

    pub fn get<F>(&self, key: KvKey, make_event: F)
    where
        F: FnOnce(KvResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(KvOperation::Get { key }).await;
            context.update_app(make_event(result));
        });
    }

    pub fn set<F>(&self, key: KvKey, value: Vec<u8>, make_event: F)
    where
        F: FnOnce(KvResult) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context
                .request_from_shell(KvOperation::Set { key, value })
                .await;
            context.update_app(make_event(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_validation_empty() {
        assert!(KvKey::new("").is_err());
        assert!(KvKey::new("   ").is_err());
    }

    #[test]
    fn test_key_validation_traversal() {
        assert!(KvKey::new("../etc/passwd").is_err());
        assert!(KvKey::new("a\0b").is_err());
    }

    #[test]
    fn test_key_validation_too_long() {
        assert!(KvKey::new("k".repeat(MAX_KEY_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_key_validation_valid() {
        let key = KvKey::new("ride_store").unwrap();
        assert_eq!(key.as_str(), "ride_store");
    }
}
