//! Profile persistence.
//!
//! Profiles live in `{root}/profiles/{uid}.json`; every uid ever handed out
//! is recorded in `{root}/uids.json` so allocation never repeats one.

use rand::Rng;
use std::collections::BTreeSet;
use std::path::PathBuf;

use super::Profile;

const MAX_ALLOCATION_ATTEMPTS: usize = 1000;
const UID_SPACE: u32 = 1_000_000;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
    #[error("'{0}' is not a 6-digit uid")]
    InvalidUid(String),
    #[error("no profile for uid {0}")]
    NotFound(String),
}

/// True for exactly six ASCII digits.
pub fn is_valid_uid(uid: &str) -> bool {
    uid.len() == 6 && uid.bytes().all(|b| b.is_ascii_digit())
}

fn format_uid(n: u32) -> String {
    format!("{:06}", n % UID_SPACE)
}

#[derive(Debug, Clone)]
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn profiles_dir(&self) -> PathBuf {
        self.root.join("profiles")
    }

    fn registry_path(&self) -> PathBuf {
        self.root.join("uids.json")
    }

    fn profile_path(&self, uid: &str) -> PathBuf {
        self.profiles_dir().join(format!("{}.json", uid))
    }

    /// All uids handed out so far. A missing registry is empty.
    pub fn allocated(&self) -> Result<BTreeSet<String>, StoreError> {
        match std::fs::read_to_string(self.registry_path()) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeSet::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_registry(&self, uids: &BTreeSet<String>) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.root)?;
        let json = serde_json::to_string_pretty(uids)?;
        std::fs::write(self.registry_path(), json)?;
        Ok(())
    }

    /// Reserve a fresh random uid.
    ///
    /// Not safe to call concurrently on the same root; callers serialize.
    pub fn allocate_uid(&self) -> Result<String, StoreError> {
        let mut uids = self.allocated()?;
        let mut rng = rand::thread_rng();

        let uid = (0..MAX_ALLOCATION_ATTEMPTS)
            .map(|_| format_uid(rng.gen_range(0..UID_SPACE)))
            .find(|candidate| !uids.contains(candidate))
            .unwrap_or_else(|| {
                log::warn!(
                    "[PROFILE] No free uid after {} attempts, using timestamp fallback",
                    MAX_ALLOCATION_ATTEMPTS
                );
                timestamp_uid()
            });

        uids.insert(uid.clone());
        self.write_registry(&uids)?;
        log::info!("[PROFILE] Allocated uid {} ({} total)", uid, uids.len());
        Ok(uid)
    }

    pub fn load(&self, uid: &str) -> Result<Profile, StoreError> {
        if !is_valid_uid(uid) {
            return Err(StoreError::InvalidUid(uid.to_string()));
        }
        match std::fs::read_to_string(self.profile_path(uid)) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(uid.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write a profile. The uid is added to the registry if a client
    /// brought its own.
    pub fn save(&self, uid: &str, profile: &Profile) -> Result<(), StoreError> {
        if !is_valid_uid(uid) {
            return Err(StoreError::InvalidUid(uid.to_string()));
        }
        std::fs::create_dir_all(self.profiles_dir())?;
        let json = serde_json::to_string_pretty(profile)?;
        std::fs::write(self.profile_path(uid), json)?;

        let mut uids = self.allocated()?;
        if uids.insert(uid.to_string()) {
            self.write_registry(&uids)?;
        }
        log::info!("[PROFILE] Saved profile for uid {}", uid);
        Ok(())
    }
}

/// Last six digits of the current Unix time in milliseconds.
fn timestamp_uid() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format_uid((millis % UID_SPACE as u128) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::RizzStyle;

    #[test]
    fn uid_validation() {
        assert!(is_valid_uid("012345"));
        assert!(!is_valid_uid("12345"));
        assert!(!is_valid_uid("12345a"));
        assert!(!is_valid_uid("../etc"));
        assert_eq!(format_uid(42), "000042");
    }

    #[test]
    fn allocated_uids_are_unique_and_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());

        let mut seen = BTreeSet::new();
        for _ in 0..50 {
            let uid = store.allocate_uid().unwrap();
            assert!(is_valid_uid(&uid));
            assert!(seen.insert(uid));
        }
        assert_eq!(store.allocated().unwrap(), seen);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        let profile = Profile {
            name: "Sam".to_string(),
            preferred_rizz: Some(RizzStyle::Smooth),
            ..Profile::default()
        };

        store.save("000007", &profile).unwrap();
        assert_eq!(store.load("000007").unwrap(), profile);
        assert!(store.allocated().unwrap().contains("000007"));
    }

    #[test]
    fn load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        assert!(matches!(store.load("999999"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.load("abc"), Err(StoreError::InvalidUid(_))));

        std::fs::create_dir_all(dir.path().join("profiles")).unwrap();
        std::fs::write(dir.path().join("profiles/123456.json"), "{not json").unwrap();
        assert!(matches!(store.load("123456"), Err(StoreError::Json(_))));
    }
}
