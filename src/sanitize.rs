//! FAT-compatible filename sanitizing.
//!
//! [`sanitize_name`] maps any string to a name that is safe on FAT-style
//! filesystems; [`is_valid_name`] is defined as `sanitize_name(s) == s`.

/// Name returned for empty, `.` and `..` inputs.
pub const INVALID_NAME: &str = "(invalid)";

/// Maximum encoded (UTF-8) length of a sanitized name, in bytes.
///
/// vfat allows 255 UCS-2 characters, but files may end up on ext4 through
/// a FUSE layer, so the byte limit applies.
pub const MAX_NAME_BYTES: usize = 255;

const ELLIPSIS: &str = "...";

/// Separator between a file name and its extension.
pub const EXTENSION_SEPARATOR: char = '.';

/// Returns `true` for characters allowed in a FAT filename.
#[inline]
pub fn is_valid_name_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{1f}' | '"' | '*' | '/' | ':' | '<' | '>' | '?' | '\\' | '|' | '\u{7f}'
    )
}

/// Map `name` to a FAT-safe filename.
///
/// 1. `""`, `"."` and `".."` become [`INVALID_NAME`].
/// 2. Control characters and `" * / : < > ? \ |` are replaced with `_`.
/// 3. Names longer than [`MAX_NAME_BYTES`] lose characters from the middle
///    and get a single `...` marker there, keeping prefix and suffix.
///
/// ```rust
/// use torrent_storage::sanitize_name;
///
/// assert_eq!(sanitize_name("a:b?.txt"), "a_b_.txt");
/// assert_eq!(sanitize_name(".."), "(invalid)");
/// ```
pub fn sanitize_name(name: &str) -> String {
    if name.is_empty() || name == "." || name == ".." {
        return INVALID_NAME.to_owned();
    }

    let mut chars: Vec<char> = name
        .chars()
        .map(|c| if is_valid_name_char(c) { c } else { '_' })
        .collect();
    trim_to_bytes(&mut chars, MAX_NAME_BYTES);

    chars.into_iter().collect()
}

/// Returns `true` if `name` is already a sanitized filename.
///
/// ```rust
/// use torrent_storage::is_valid_name;
///
/// assert!(is_valid_name("ubuntu.iso"));
/// assert!(!is_valid_name("what?.iso"));
/// assert!(!is_valid_name(""));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    sanitize_name(name) == name
}

fn trim_to_bytes(chars: &mut Vec<char>, max_bytes: usize) {
    let mut len: usize = chars.iter().map(|c| c.len_utf8()).sum();
    if len <= max_bytes {
        return;
    }
    let budget = max_bytes - ELLIPSIS.len();
    while len > budget {
        let removed = chars.remove(chars.len() / 2);
        len -= removed.len_utf8();
    }
    let mid = chars.len() / 2;
    chars.splice(mid..mid, ELLIPSIS.chars());
}

/// Extension of `file_name`: the text after the last `.`, or `""` when there
/// is none or a path separator follows the last `.`.
///
/// ```rust
/// use torrent_storage::extension;
///
/// assert_eq!(extension("movie.mkv"), "mkv");
/// assert_eq!(extension("dir.d/README"), "");
/// ```
pub fn extension(file_name: &str) -> &str {
    let Some(dot) = file_name.rfind(EXTENSION_SEPARATOR) else {
        return "";
    };
    match file_name.rfind(|c| c == '/' || c == std::path::MAIN_SEPARATOR) {
        Some(sep) if sep > dot => "",
        _ => &file_name[dot + 1..],
    }
}
