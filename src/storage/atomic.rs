use std::fs::create_dir_all;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

/// Writes `path` through a temporary file in the same directory and renames it into place,
/// so readers never observe a partially written file. Parent directories are created.
pub fn write_atomically<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new(".")
    };

    create_dir_all(directory)?;

    let mut file = NamedTempFile::new_in(directory)?;

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    file.persist(path).map_err(|error| error.error)?;

    Ok(())
}
