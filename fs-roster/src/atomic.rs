use std::fs;
use std::path::Path;

use track_error::{Result, TrackError};

/// Write data to a temporary file next to the destination and rename it
/// over. The temporary file stays on the same filesystem, so the rename
/// cannot degrade into a copy.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        TrackError::Path(format!(
            "{} has no parent directory",
            path.display()
        ))
    })?;
    fs::create_dir_all(parent)?;

    let file_name = path.file_name().ok_or_else(|| {
        TrackError::Path(format!("{} has no file name", path.display()))
    })?;
    let mut tmp_name = file_name.to_os_string();
    tmp_name.push(".tmp");
    let tmp = parent.join(tmp_name);

    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
