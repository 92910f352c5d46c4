use crate::{UrlError, UrlResult};

/// Extracts a spreadsheet id from a pasted spreadsheet link or a bare id
///
/// Links look like `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0`;
/// anything else is treated as an id and must only contain letters, digits,
/// `-` and `_`.
///
/// # Examples
///
/// ```
/// use upload_tracker::url::spreadsheet_id_from_input;
///
/// let id = spreadsheet_id_from_input(
///     "https://docs.google.com/spreadsheets/d/1AbC-d_E/edit?gid=0#gid=0",
/// ).unwrap();
/// assert_eq!(id, "1AbC-d_E");
/// ```
pub fn spreadsheet_id_from_input(input: &str) -> UrlResult<String> {
    let trimmed = input.trim();

    let candidate = match trimmed.split_once("/d/") {
        Some((_, rest)) => rest
            .split(|c: char| c == '/' || c == '?' || c == '#')
            .next()
            .unwrap_or_default(),
        None => trimmed,
    };

    if candidate.is_empty()
        || !candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(UrlError::Parse(format!(
            "Not a spreadsheet URL or id: '{}'",
            input
        )));
    }

    Ok(candidate.to_string())
}
