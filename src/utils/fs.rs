//! Filesystem helpers shared by the interactors

use std::fs;
use std::io;
use std::path::Path;

use filetime::FileTime;

/// Create `dir` and its parents; succeeds when it already exists
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Remove a stale artifact. Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Copy access and modification times from `source` onto `target`
pub fn preserve_timestamps(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let accessed = FileTime::from_last_access_time(&metadata);
    let modified = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(target, accessed, modified)
}

/// Copy a file and carry its timestamps over
pub fn copy_preserving(source: &Path, target: &Path) -> io::Result<u64> {
    let bytes = fs::copy(source, target)?;
    preserve_timestamps(source, target)?;
    Ok(bytes)
}
