//! Implements WorkspaceStoragePort using a JSON file.
//!
//! One namespaced key per workspace tag, so reopening a workspace survives restarts.

use crate::domain::{DomainError, SavedWorkspace, TenantModel};
use crate::ports::WorkspaceStoragePort;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const KEY_PREFIX: &str = "event-board__workspace__";

/// File contents: storage key -> `{tag, token}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct WorkspaceData {
    entries: BTreeMap<String, SavedWorkspace>,
}

fn storage_key(tag: &str) -> String {
    format!("{}{}", KEY_PREFIX, tag)
}

pub struct WorkspaceJson {
    path: PathBuf,
    cache: RwLock<WorkspaceData>,
}

impl WorkspaceJson {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache: RwLock::new(WorkspaceData::default()),
        }
    }

    /// Load entries from disk. A missing file is an empty store; an unreadable one is
    /// logged and treated as empty.
    pub async fn load(&self) -> Result<(), DomainError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "workspace file unreadable, starting empty");
                WorkspaceData::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => WorkspaceData::default(),
            Err(e) => {
                return Err(DomainError::Storage(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        debug!(count = data.entries.len(), "saved workspaces loaded");
        *self.cache.write().await = data;
        Ok(())
    }

    /// Write-replace: temp file, fsync, rename.
    async fn save(&self) -> Result<(), DomainError> {
        let data = self.cache.read().await;
        let json = serde_json::to_string_pretty(&*data)
            .map_err(|e| DomainError::Storage(e.to_string()))?;

        let temp_path = self.path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkspaceStoragePort for WorkspaceJson {
    async fn save_workspace(&self, tenant: &TenantModel) -> Result<(), DomainError> {
        let Some(token) = tenant.token() else {
            return Err(DomainError::InvalidInput(format!(
                "workspace \"{}\" has no token to save",
                tenant.tag
            )));
        };
        {
            let mut cache = self.cache.write().await;
            cache.entries.insert(
                storage_key(&tenant.tag),
                SavedWorkspace {
                    tag: tenant.tag.clone(),
                    token: token.to_string(),
                },
            );
        }
        debug!(tag = %tenant.tag, "workspace saved");
        self.save().await
    }

    async fn get_workspace(&self, tag: &str) -> Result<SavedWorkspace, DomainError> {
        self.cache
            .read()
            .await
            .entries
            .get(&storage_key(tag))
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("Workspace \"{}\" not found", tag)))
    }

    async fn list_workspaces(&self) -> Result<Vec<SavedWorkspace>, DomainError> {
        let cache = self.cache.read().await;
        let mut all: Vec<SavedWorkspace> = cache.entries.values().cloned().collect();
        all.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use tempfile::tempdir;

    fn tenant(tag: &str, token: Option<&str>) -> TenantModel {
        TenantModel {
            role: Role::Editor,
            tag: tag.into(),
            admin_token: None,
            editor_token: token.map(Into::into),
            visitor_token: None,
        }
    }

    #[tokio::test]
    async fn test_saved_workspace_survives_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workspaces.json");

        let store = WorkspaceJson::new(&path);
        store.load().await.unwrap();
        store.save_workspace(&tenant("Home", Some("t1"))).await.unwrap();

        let reopened = WorkspaceJson::new(&path);
        reopened.load().await.unwrap();
        let saved = reopened.get_workspace("Home").await.unwrap();
        assert_eq!(
            saved,
            SavedWorkspace {
                tag: "Home".into(),
                token: "t1".into()
            }
        );

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("event-board__workspace__Home"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_tag_is_not_found() {
        let dir = tempdir().unwrap();
        let store = WorkspaceJson::new(dir.path().join("workspaces.json"));
        store.load().await.unwrap();

        let err = store.get_workspace("Office").await.unwrap_err();
        assert_eq!(
            err,
            DomainError::NotFound("Workspace \"Office\" not found".into())
        );
    }

    #[tokio::test]
    async fn test_saving_same_tag_overwrites_and_list_is_sorted() {
        let dir = tempdir().unwrap();
        let store = WorkspaceJson::new(dir.path().join("workspaces.json"));
        store.save_workspace(&tenant("Work", Some("w1"))).await.unwrap();
        store.save_workspace(&tenant("Home", Some("h1"))).await.unwrap();
        store.save_workspace(&tenant("Work", Some("w2"))).await.unwrap();

        let all = store.list_workspaces().await.unwrap();
        let tags: Vec<&str> = all.iter().map(|w| w.tag.as_str()).collect();
        assert_eq!(tags, vec!["Home", "Work"]);
        assert_eq!(all[1].token, "w2");
    }

    #[tokio::test]
    async fn test_tokenless_tenant_is_rejected() {
        let dir = tempdir().unwrap();
        let store = WorkspaceJson::new(dir.path().join("workspaces.json"));
        assert!(store.save_workspace(&tenant("Home", None)).await.is_err());
        assert!(store.list_workspaces().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("workspaces.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = WorkspaceJson::new(&path);
        store.load().await.unwrap();
        assert!(store.list_workspaces().await.unwrap().is_empty());
    }
}
