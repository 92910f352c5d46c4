//! Chrome profile hygiene between targets

use std::io;
use std::path::Path;

const CACHE_DIRS: &[&str] = &["Cache", "Code Cache", "GPUCache"];
const HISTORY_FILES: &[&str] = &["History", "Visited Links", "Web Data"];
const LOGIN_FILES: &[&str] = &["Cookies", "Login Data"];

/// Removes cache and history from the profile's `Default` directory
///
/// Cookies and saved logins are only removed when `keep_login` is false.
/// Missing entries are skipped.
///
/// # Returns
///
/// The number of entries actually removed
pub fn clear_profile_cache(user_data_dir: &Path, keep_login: bool) -> io::Result<usize> {
    let default_dir = user_data_dir.join("Default");
    let mut removed = 0;

    for name in CACHE_DIRS {
        if remove_ignoring_missing(&default_dir.join(name), true)? {
            removed += 1;
        }
    }

    let files = HISTORY_FILES
        .iter()
        .chain(LOGIN_FILES.iter().filter(|_| !keep_login));
    for name in files {
        if remove_ignoring_missing(&default_dir.join(name), false)? {
            removed += 1;
        }
    }

    Ok(removed)
}

fn remove_ignoring_missing(path: &Path, is_dir: bool) -> io::Result<bool> {
    let result = if is_dir {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
