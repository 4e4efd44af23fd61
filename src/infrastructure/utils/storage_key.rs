use std::path::Path;

use url::Url;

/// Top-level key segment for every media object.
pub const MEDIA_PREFIX: &str = "media";
const THUMBNAIL_DIR: &str = "thumbnails";
const MAX_EXTENSION_LENGTH: usize = 10;

/// `media/{id}.{ext}`, with the extension taken from the original file name
/// or, failing that, the MIME subtype.
pub fn media_key(id: &str, original_name: &str, mime_type: &str) -> String {
    match extension_for(original_name, mime_type) {
        Some(ext) => format!("{MEDIA_PREFIX}/{id}.{ext}"),
        None => format!("{MEDIA_PREFIX}/{id}"),
    }
}

pub fn thumbnail_key(id: &str) -> String {
    format!("{MEDIA_PREFIX}/{THUMBNAIL_DIR}/{id}.jpg")
}

pub fn extension_for(original_name: &str, mime_type: &str) -> Option<String> {
    let from_name = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let from_mime = mime_type
        .split_once('/')
        .map(|(_, subtype)| {
            subtype
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase()
        });

    [from_name, from_mime]
        .into_iter()
        .flatten()
        .find(|ext| is_safe_extension(ext))
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LENGTH
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Recovers an object key from a retrieval URL.
///
/// Drops the query string and everything in the (percent-decoded) path before
/// the last `media` segment, so path-style, virtual-hosted, CDN and
/// `/o/{encoded-key}` URLs all resolve to the same key.
pub fn key_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = urlencoding::decode(parsed.path()).ok()?;

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let start = segments.iter().rposition(|s| *s == MEDIA_PREFIX)?;

    // The key needs at least one segment after the prefix
    if start + 1 >= segments.len() {
        return None;
    }

    Some(segments[start..].join("/"))
}
