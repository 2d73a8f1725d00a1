//! URI normalization for the document service's `map<URI, DocumentService>`
//! key, per distilled spec §4.5.
//!
//! Buffer content always arrives over the wire (`didOpen`/`didChange`
//! carry full text, never a filesystem path), so this crate carries none
//! of the `file://` ↔ path conversion a server that reads files from disk
//! would need — only what two different URI spellings of the same
//! resource need to collide on the same map key.

use url::Url;

/// Normalize a URI to a canonical string suitable for use as a document
/// map key.
///
/// Lowercases a Windows drive letter immediately after `file:///` (`file
/// :///C:/foo` and `file:///c:/foo` name the same file; editors are not
/// consistent about which case they send). Returns the input unchanged if
/// it does not parse as a URL at all, rather than rejecting it — an
/// unparseable key is still a fine, if inert, map key.
pub fn normalize_key(uri: &str) -> String {
    let Ok(parsed) = Url::parse(uri) else {
        return uri.to_string();
    };
    let s = parsed.as_str();
    let Some(rest) = s.strip_prefix("file:///") else {
        return s.to_string();
    };
    let bytes = rest.as_bytes();
    if bytes.len() > 1 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return format!("file:///{}{}", rest[..1].to_ascii_lowercase(), &rest[1..]);
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_drive_letter_is_lowercased() {
        assert_eq!(normalize_key("file:///C:/Users/test.lox"), "file:///c:/Users/test.lox");
    }

    #[test]
    fn already_lowercase_drive_is_unchanged() {
        assert_eq!(normalize_key("file:///c:/Users/test.lox"), "file:///c:/Users/test.lox");
    }

    #[test]
    fn unix_path_is_unaffected() {
        assert_eq!(normalize_key("file:///tmp/test.lox"), "file:///tmp/test.lox");
    }

    #[test]
    fn unparseable_input_is_returned_as_is() {
        assert_eq!(normalize_key("not-a-uri"), "not-a-uri");
    }
}
