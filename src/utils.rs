//! # Utility Functions Module
//!
//! Small helpers shared by the argument builders and the log output.

use std::path::Path;

/// Builds an ffmpeg argument vector from mixed `ToString` items.
///
/// # Example
/// ```rust
/// use video_tools::args;
///
/// let crf = 23;
/// let args = args!["-crf", crf, "-preset", "medium"];
/// assert_eq!(args, vec!["-crf", "23", "-preset", "medium"]);
/// ```
#[macro_export]
macro_rules! args {
    [$($item:expr),* $(,)?] => {
        vec![$($item.to_string()),*]
    };
}

/// Lossy string form of a path, as handed to ffmpeg on the command line
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Normalizes a user-supplied extension to the `.ext` form.
pub fn normalize_extension(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

/// Quotes an argument for display in a copy-pasteable command line.
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+%,@".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// Get human-readable file size
pub fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = size as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", size as u64, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
