//! Single-instance guard for the agent.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::AppError;
use crate::config::project_dirs;

pub const LOCK_FILE_NAME: &str = "arcsight.lock";

/// Held for the lifetime of the agent; a second `acquire` on the same path
/// fails with [`AppError::AlreadyRunning`] until this is dropped.
pub struct InstanceLock {
    path: PathBuf,
    #[cfg(not(target_os = "windows"))]
    _guard: nix::fcntl::Flock<std::fs::File>,
    #[cfg(target_os = "windows")]
    _file: std::fs::File,
}

pub fn default_lock_path() -> PathBuf {
    project_dirs()
        .map(|pd| pd.data_local_dir().join(LOCK_FILE_NAME))
        .unwrap_or_else(|| std::env::temp_dir().join(LOCK_FILE_NAME))
}

impl InstanceLock {
    #[cfg(not(target_os = "windows"))]
    pub fn acquire(path: &Path) -> Result<Self, AppError> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)?;
        let guard = match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(g) => g,
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                return Err(AppError::AlreadyRunning(path.to_path_buf()));
            }
            Err((_, errno)) => return Err(AppError::Io(errno.into())),
        };
        guard.set_len(0)?;
        writeln!(&*guard, "{}", std::process::id())?;
        debug!(path=?path.display(), "instance lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
            _guard: guard,
        })
    }

    #[cfg(target_os = "windows")]
    pub fn acquire(path: &Path) -> Result<Self, AppError> {
        use std::os::windows::fs::OpenOptionsExt;
        const ERROR_SHARING_VIOLATION: i32 = 32;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = match std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .share_mode(0)
            .open(path)
        {
            Ok(f) => f,
            Err(e) if e.raw_os_error() == Some(ERROR_SHARING_VIOLATION) => {
                return Err(AppError::AlreadyRunning(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(&file, "{}", std::process::id())?;
        debug!(path=?path.display(), "instance lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for InstanceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceLock")
            .field("path", &self.path)
            .finish()
    }
}
