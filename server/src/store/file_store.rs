use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::config::StorageSection;
use crate::engine::server::Server;
use crate::engine::user::User;

use super::StoreError;
use super::records::{Header, ServerRecord, UserRecord};

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Flat-file persistence: one file for users, one for servers (with their
/// channels and messages nested inside each record).
#[derive(Debug, Clone)]
pub struct FileStore {
    users_path: PathBuf,
    servers_path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>, users_file: &str, servers_file: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            users_path: dir.join(users_file),
            servers_path: dir.join(servers_file),
        }
    }

    pub fn from_config(storage: &StorageSection) -> Self {
        Self::new(&storage.data_dir, &storage.users_file, &storage.servers_file)
    }

    pub fn users_path(&self) -> &Path {
        &self.users_path
    }

    pub fn servers_path(&self) -> &Path {
        &self.servers_path
    }

    /// Load every user and server. Missing files load as empty.
    pub async fn load_all(&self) -> Result<(Vec<User>, Vec<Server>), StoreError> {
        let users: Vec<UserRecord> = read_records(&self.users_path).await?;
        let servers: Vec<ServerRecord> = read_records(&self.servers_path).await?;

        info!(
            users = users.len(),
            servers = servers.len(),
            "loaded state from disk"
        );

        Ok((
            users.into_iter().map(User::from).collect(),
            servers.into_iter().map(Server::from).collect(),
        ))
    }

    /// Replace both files with the given collections.
    pub async fn save_all(&self, users: &[User], servers: &[Server]) -> Result<(), StoreError> {
        let users: Vec<UserRecord> = users.iter().map(UserRecord::from).collect();
        let servers: Vec<ServerRecord> = servers.iter().map(ServerRecord::from).collect();

        write_records(&self.users_path, &users).await?;
        write_records(&self.servers_path, &servers).await?;

        info!(
            users = users.len(),
            servers = servers.len(),
            "saved state to disk"
        );
        Ok(())
    }
}

async fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no data file, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StoreError::io(path, e)),
    };

    let mut lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((_, first)) = lines.next() else {
        return Ok(Vec::new());
    };
    let header: Header =
        serde_json::from_str(first).map_err(|e| StoreError::parse(path, 1, e))?;
    if header.version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            version: header.version,
        });
    }

    let mut records = Vec::with_capacity(header.count);
    for (idx, line) in lines {
        let record = serde_json::from_str(line).map_err(|e| StoreError::parse(path, idx + 1, e))?;
        records.push(record);
    }

    if records.len() != header.count {
        warn!(
            path = %path.display(),
            expected = header.count,
            found = records.len(),
            "record count mismatch"
        );
    }

    Ok(records)
}

async fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<(), StoreError> {
    let header = Header {
        version: FORMAT_VERSION,
        count: records.len(),
    };

    let mut out = serde_json::to_string(&header).map_err(|e| StoreError::encode(path, e))?;
    out.push('\n');
    for record in records {
        out.push_str(&serde_json::to_string(record).map_err(|e| StoreError::encode(path, e))?);
        out.push('\n');
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    // Write a sibling, then rename over the target.
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, out)
        .await
        .map_err(|e| StoreError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    Ok(())
}
