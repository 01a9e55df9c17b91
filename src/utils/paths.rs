use std::path::Path;

use anyhow::{Result, anyhow};

/// Path of `absolute` below `root`, with forward slashes on every platform
///
/// Both paths are canonicalized when they exist so symlinked roots (for
/// example `/var` -> `/private/var` on macOS) still match.
pub fn to_relative_unix_style(absolute: &Path, root: &Path) -> Result<String> {
    let (path, root) = match (absolute.canonicalize(), root.canonicalize()) {
        (Ok(path), Ok(root)) => (path, root),
        _ => (absolute.to_path_buf(), root.to_path_buf()),
    };

    let relative = path.strip_prefix(&root).map_err(|_| {
        anyhow!(
            "{} is not under root {}",
            path.display(),
            root.display()
        )
    })?;

    Ok(relative.to_string_lossy().replace('\\', "/"))
}

/// Forward-slash rendering of any path
pub fn to_unix_style(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
