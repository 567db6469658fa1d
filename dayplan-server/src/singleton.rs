//! Only one dayplan-server may own the planner state at a time.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use fs2::FileExt;

/// Holds the exclusive lock until dropped.
pub struct LockGuard {
    _file: File,
}

fn lock_path() -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine runtime directory")?;

    let dir = runtime_dir.join("dayplan");
    fs::create_dir_all(&dir)?;

    Ok(dir.join("server.lock"))
}

/// Take the server lock and record our PID in it.
/// Fails with the holder's PID if another instance is running.
pub fn acquire_lock() -> Result<LockGuard> {
    let path = lock_path()?;
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;

    if file.try_lock_exclusive().is_err() {
        let mut holder = String::new();
        let _ = file.read_to_string(&mut holder);
        let holder = holder.trim();

        anyhow::bail!(
            "Another dayplan-server instance is already running (pid {}).\n\
            If you believe this is an error, remove: {}",
            if holder.is_empty() { "unknown" } else { holder },
            path.display()
        );
    }

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()?;

    Ok(LockGuard { _file: file })
}
