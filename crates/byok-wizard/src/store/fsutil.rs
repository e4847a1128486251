use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;

use super::StoreError;

/// Create `dir` (and parents) owner-only if it does not exist yet.
pub fn ensure_secure_dir(dir: &Path) -> Result<(), StoreError> {
    if dir.exists() {
        return Ok(());
    }
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| StoreError::io("create directory", dir, e))
}

/// Best-effort `0600` on unix; a no-op elsewhere.
pub fn set_secure_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            tracing::debug!("chmod 600 failed for {}: {}", path.display(), e);
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

/// Write via a temp file in the same directory, then rename over `path`.
pub fn atomic_write(path: &Path, contents: &str) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = dir.join(format!(
        ".tmp.{}.{}",
        chrono::Utc::now().timestamp_millis(),
        uuid::Uuid::new_v4().simple()
    ));

    let write = || -> io::Result<()> {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(contents.as_bytes())?;
        f.sync_all()
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io("write", &tmp, e));
    }
    set_secure_permissions(&tmp);

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(StoreError::io("replace", path, e));
    }
    Ok(())
}

/// Serialize with two-space indentation and write atomically.
pub fn write_json(path: &Path, value: &impl serde::Serialize) -> Result<(), StoreError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    atomic_write(path, &text)
}

/// Parsed JSON content of `path`.
///
/// A missing file is `None`; so is content that is not valid JSON.
pub fn read_json(path: &Path) -> Result<Option<Value>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io("read", path, e)),
    };
    match serde_json::from_str(&text) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            tracing::warn!("ignoring invalid JSON in {}: {}", path.display(), e);
            Ok(None)
        }
    }
}
