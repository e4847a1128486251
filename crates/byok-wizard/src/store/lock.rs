use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use backoff::ExponentialBackoffBuilder;

use super::StoreError;
use super::fsutil::{ensure_secure_dir, set_secure_permissions};

const LOCK_RETRIES: u32 = 10;
const STALE_AFTER: Duration = Duration::from_secs(10);

/// Cross-process lock on a file, held as a `<file>.lock` directory.
///
/// The directory is removed when the guard drops.
#[derive(Debug)]
pub struct FileLock {
    dir: PathBuf,
}

impl FileLock {
    /// Waits between attempts on the tokio timer, never blocking the thread.
    pub async fn acquire(target: &Path) -> Result<Self, StoreError> {
        let dir = lock_dir(target);
        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_multiplier(2.0)
            .with_max_interval(Duration::from_millis(1000))
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build();

        let mut attempts = 0u32;
        let op = || {
            let attempt = match fs::create_dir(&dir) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if is_stale(&dir) {
                        tracing::warn!("reclaiming stale lock {}", dir.display());
                        let _ = fs::remove_dir(&dir);
                    }
                    attempts += 1;
                    if attempts > LOCK_RETRIES {
                        Err(backoff::Error::permanent(StoreError::LockTimeout {
                            path: target.to_path_buf(),
                        }))
                    } else {
                        Err(backoff::Error::transient(StoreError::LockTimeout {
                            path: target.to_path_buf(),
                        }))
                    }
                }
                Err(e) => Err(backoff::Error::permanent(StoreError::io(
                    "create lock",
                    &dir,
                    e,
                ))),
            };
            std::future::ready(attempt)
        };

        backoff::future::retry(policy, op).await?;
        tracing::debug!("acquired lock {}", dir.display());
        Ok(Self { dir })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir(&self.dir) {
            tracing::warn!("failed to release lock {}: {}", self.dir.display(), e);
        }
    }
}

fn lock_dir(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn is_stale(dir: &Path) -> bool {
    fs::metadata(dir)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|t| SystemTime::now().duration_since(t).ok())
        .is_some_and(|age| age > STALE_AFTER)
}

/// Run `op` while holding the lock on `target`.
///
/// The parent directory is created and `target` is seeded with
/// `default_content` first, so the locked file always exists.
pub async fn with_file_lock<T>(
    target: &Path,
    default_content: &str,
    op: impl FnOnce() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    if let Some(parent) = target.parent() {
        ensure_secure_dir(parent)?;
    }
    seed(target, default_content)?;
    let _guard = FileLock::acquire(target).await?;
    op()
}

/// Create `target` with `content` unless some process already has.
fn seed(target: &Path, content: &str) -> Result<(), StoreError> {
    match OpenOptions::new().write(true).create_new(true).open(target) {
        Ok(mut file) => {
            file.write_all(content.as_bytes())
                .map_err(|e| StoreError::io("create", target, e))?;
            set_secure_permissions(target);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(StoreError::io("create", target, e)),
    }
}
