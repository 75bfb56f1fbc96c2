use std::path::Path;

use uuid::Uuid;

const MAX_EXTENSION_LEN: usize = 8;

/// Extension of a client supplied file name, lowercased, if it is short and
/// plain ASCII alphanumeric. Anything else is dropped.
pub fn safe_extension(original: &str) -> Option<String> {
    let ext = Path::new(original).extension()?.to_str()?;
    if ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Build an opaque file name for an upload. The client name only contributes
/// its extension, never a path component.
pub fn opaque_file_name(original: Option<&str>) -> String {
    let id = Uuid::new_v4();
    match original.and_then(safe_extension) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}
