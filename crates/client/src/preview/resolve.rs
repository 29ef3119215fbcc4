//! Resolution of image and icon references found in page markup.

use url::Url;

use crate::fetch::origin_of;

/// Resolve a possibly relative reference against the target page.
///
/// - absolute URLs (anything with a scheme) pass through unchanged
/// - protocol-relative `//host/path` becomes `https://host/path`
/// - root-relative `/path` is prefixed with the target's origin
/// - any other relative path is joined to the origin with a `/`
///
/// Relative paths resolve against the origin, not the page's directory.
pub fn resolve_url(value: &str, target: &Url) -> String {
    let value = value.trim();

    if value.starts_with("//") {
        return format!("https:{value}");
    }

    if Url::parse(value).is_ok() {
        return value.to_string();
    }

    let origin = origin_of(target);
    if value.starts_with('/') { format!("{origin}{value}") } else { format!("{origin}/{value}") }
}
