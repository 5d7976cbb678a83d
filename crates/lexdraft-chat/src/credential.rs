//! The API credential and where it is kept between runs.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::client::{ChatClient, ChatMessage};
use crate::error::ChatError;

/// Key under which the credential is stored.
pub const CREDENTIAL_KEY: &str = "deepseek_api_key";

/// An opaque API secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Persistent home of the single process-wide credential.
pub trait CredentialStore {
    fn load(&self) -> io::Result<Option<Credential>>;
    fn save(&mut self, credential: &Credential) -> io::Result<()>;
    fn clear(&mut self) -> io::Result<()>;
}

/// Keeps the credential for the lifetime of the value only.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Option<Credential>,
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> io::Result<Option<Credential>> {
        Ok(self.credential.clone())
    }

    fn save(&mut self, credential: &Credential) -> io::Result<()> {
        self.credential = Some(credential.clone());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.credential = None;
        Ok(())
    }
}

/// A JSON key/value file. Other keys in the file are left alone.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> io::Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => serde_json::from_str(&text)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(map)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, json)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> io::Result<Option<Credential>> {
        Ok(self.read_map()?.remove(CREDENTIAL_KEY).map(Credential))
    }

    fn save(&mut self, credential: &Credential) -> io::Result<()> {
        let mut map = self.read_map()?;
        map.insert(CREDENTIAL_KEY.to_string(), credential.expose().to_string());
        self.write_map(&map)?;
        info!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        let mut map = self.read_map()?;
        if map.remove(CREDENTIAL_KEY).is_some() {
            self.write_map(&map)?;
            info!(path = %self.path.display(), "credential cleared");
        }
        Ok(())
    }
}

/// Setup flow: try `key` with a one-message request and keep it only if
/// the service accepts it.
///
/// On failure the key is removed from both the client and the store.
pub async fn validate_credential(
    client: &mut ChatClient,
    store: &mut dyn CredentialStore,
    key: &str,
) -> Result<(), ChatError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(ChatError::CredentialMissing);
    }

    let credential = Credential::new(key);
    client.set_credential(credential.clone());

    match client.chat(&[ChatMessage::user("Hello")]).await {
        Ok(_) => {
            store.save(&credential)?;
            info!("credential validated");
            Ok(())
        }
        Err(e) => {
            client.clear_credential();
            if let Err(clear_err) = store.clear() {
                warn!(error = %clear_err, "could not clear stored credential");
            }
            warn!(error = %e, "credential validation failed");
            let message = match e {
                ChatError::Remote { message, .. } => message,
                other => other.to_string(),
            };
            Err(ChatError::CredentialInvalid(message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChatConfig;
    use crate::testing::{client_for, completion_server};

    /// Store whose `clear` always fails, as with a read-only file.
    #[derive(Default)]
    struct StuckStore {
        inner: MemoryCredentialStore,
    }

    impl CredentialStore for StuckStore {
        fn load(&self) -> io::Result<Option<Credential>> {
            self.inner.load()
        }

        fn save(&mut self, credential: &Credential) -> io::Result<()> {
            self.inner.save(credential)
        }

        fn clear(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }
    }

    #[test]
    fn debug_redacts_secret() {
        let credential = Credential::new("sk-very-secret");
        assert_eq!(format!("{credential:?}"), "Credential(<redacted>)");
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("nested/credentials.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/credentials.json");
        let mut store = FileCredentialStore::new(&path);

        store.save(&Credential::new("sk-abc")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().expose(), "sk-abc");

        // A fresh store on the same path sees the saved key.
        let reopened = FileCredentialStore::new(&path);
        assert_eq!(reopened.load().unwrap().unwrap().expose(), "sk-abc");

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_clear_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"theme":"dark","deepseek_api_key":"sk-abc"}"#).unwrap();

        let mut store = FileCredentialStore::new(&path);
        store.clear().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let map: BTreeMap<String, String> = serde_json::from_str(&text).unwrap();
        assert_eq!(map.get("theme").map(String::as_str), Some("dark"));
        assert!(!map.contains_key(CREDENTIAL_KEY));
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileCredentialStore::new(&path);
        assert_eq!(store.load().unwrap_err().kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn validate_blank_key_is_missing() {
        let mut client = ChatClient::new(ChatConfig::default(), None).unwrap();
        let mut store = MemoryCredentialStore::default();
        let err = validate_credential(&mut client, &mut store, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::CredentialMissing));
    }

    #[tokio::test]
    async fn validate_success_persists_key() {
        let server =
            completion_server(200, r#"{"choices":[{"message":{"content":"Hi!"}}]}"#).await;
        let mut client = client_for(&server, None);
        let mut store = MemoryCredentialStore::default();

        validate_credential(&mut client, &mut store, "sk-good").await.unwrap();

        assert_eq!(client.credential().unwrap().expose(), "sk-good");
        assert_eq!(store.load().unwrap().unwrap().expose(), "sk-good");
    }

    #[tokio::test]
    async fn validate_failure_clears_key_everywhere() {
        let server =
            completion_server(401, r#"{"error":{"message":"Authentication Fails"}}"#).await;
        let mut client = client_for(&server, None);
        let mut store = MemoryCredentialStore::default();
        store.save(&Credential::new("sk-old")).unwrap();

        let err = validate_credential(&mut client, &mut store, "sk-bad")
            .await
            .unwrap_err();

        match err {
            ChatError::CredentialInvalid(message) => assert_eq!(message, "Authentication Fails"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.credential().is_none());
        assert!(store.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn validate_failure_reports_rejection_even_if_clear_fails() {
        let server =
            completion_server(401, r#"{"error":{"message":"Authentication Fails"}}"#).await;
        let mut client = client_for(&server, None);
        let mut store = StuckStore::default();

        let err = validate_credential(&mut client, &mut store, "sk-bad")
            .await
            .unwrap_err();

        match err {
            ChatError::CredentialInvalid(message) => assert_eq!(message, "Authentication Fails"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.credential().is_none());
    }
}
