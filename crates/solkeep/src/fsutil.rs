use crate::errors::WalletError;
use rand::Rng as _;
use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    path::{Path, PathBuf},
};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt as _;

pub const MODE_FILE_PRIVATE: u32 = 0o600;

/// Create `dir` and any missing parents. Succeeds if it already exists as a directory.
pub fn ensure_dir(dir: &Path) -> Result<(), WalletError> {
    match fs::metadata(dir) {
        Ok(md) if md.is_dir() => Ok(()),
        Ok(_) => Err(WalletError::io(
            "expected directory at",
            dir,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "not a directory"),
        )),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| WalletError::io("create dir", dir, e))
        }
        Err(e) => Err(WalletError::io("stat", dir, e)),
    }
}

fn open_new_private(path: &Path) -> std::io::Result<fs::File> {
    let mut oo = OpenOptions::new();
    oo.create_new(true).write(true);
    #[cfg(unix)]
    {
        oo.mode(MODE_FILE_PRIVATE);
    }
    oo.open(path)
}

fn write_all_synced(mut f: fs::File, path: &Path, bytes: &[u8]) -> Result<(), WalletError> {
    f.write_all(bytes)
        .map_err(|e| WalletError::io("write", path, e))?;
    f.flush().map_err(|e| WalletError::io("flush", path, e))?;
    f.sync_all().map_err(|e| WalletError::io("fsync", path, e))?;
    Ok(())
}

/// Write `bytes` to a file that must not exist yet.
pub fn write_new_private(path: &Path, bytes: &[u8]) -> Result<(), WalletError> {
    let f = open_new_private(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::AlreadyExists {
            WalletError::AlreadyExists(path.to_path_buf())
        } else {
            WalletError::io("create", path, e)
        }
    })?;
    write_all_synced(f, path, bytes)
}

fn tmp_path_for(parent: &Path, final_name: &Path) -> PathBuf {
    let base = final_name
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("wallet");
    let mut rand_bytes = [0_u8; 8];
    rand::rng().fill_bytes(&mut rand_bytes);
    let suffix = hex::encode(rand_bytes);
    parent.join(format!(".{base}.tmp.{suffix}"))
}

/// Replace `path` with `bytes` via a temp file and rename.
pub fn write_replace_private(path: &Path, bytes: &[u8]) -> Result<(), WalletError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp = tmp_path_for(parent, path);

    let f = open_new_private(&tmp).map_err(|e| WalletError::io("open temp", &tmp, e))?;
    if let Err(e) = write_all_synced(f, &tmp, bytes) {
        drop(fs::remove_file(&tmp));
        return Err(e);
    }

    // `rename` is atomic on Unix. On Windows, this can fail if the destination exists.
    #[cfg(windows)]
    {
        if path.exists() {
            fs::remove_file(path).map_err(|e| WalletError::io("remove existing", path, e))?;
        }
    }

    fs::rename(&tmp, path).map_err(|e| {
        drop(fs::remove_file(&tmp));
        WalletError::io("rename temp onto", path, e)
    })
}
