//! Open Graph and HTML metadata extraction.
//!
//! Uses a tolerant HTML parser instead of pattern matching so attribute
//! order, quoting, and entity encoding do not matter. Lookup precedence:
//!
//! | field         | first choice      | fallback                      |
//! |---------------|-------------------|-------------------------------|
//! | `title`       | `og:title`        | `<title>`                     |
//! | `description` | `og:description`  | `description`                 |
//! | `image`       | `og:image`        | none                          |
//! | `siteName`    | `og:site_name`    | target hostname               |
//! | `url`         | `og:url`          | the URL as requested          |
//! | `favicon`     | icon link tags    | `<origin>/favicon.ico`        |

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::OgMetadata;
use super::resolve::resolve_url;
use crate::fetch::origin_of;

static META: LazyLock<Selector> = LazyLock::new(|| Selector::parse("meta").expect("invalid selector"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").expect("invalid selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("link[href]").expect("invalid selector"));

/// Icon `rel` values, in priority order.
const ICON_RELS: &[&[&str]] = &[&["icon", "shortcut icon"], &["apple-touch-icon"]];

/// Extract preview metadata from a page.
///
/// `target` is the parsed page URL used for hostname and origin fallbacks;
/// `requested` is the URL exactly as the caller supplied it.
pub fn extract_metadata(html: &str, target: &Url, requested: &str) -> OgMetadata {
    let document = Html::parse_document(html);

    OgMetadata {
        title: meta_content(&document, "og:title").or_else(|| title_text(&document)),
        description: meta_content(&document, "og:description").or_else(|| meta_content(&document, "description")),
        image: meta_content(&document, "og:image").map(|image| resolve_url(&image, target)),
        site_name: meta_content(&document, "og:site_name").or_else(|| target.host_str().map(String::from)),
        url: meta_content(&document, "og:url").or_else(|| Some(requested.to_string())),
        favicon: Some(favicon(&document, target)),
    }
}

/// Content of the first `<meta>` whose `property` matches `key`, falling
/// back to the first whose `name` matches. Empty content never matches.
pub fn meta_content(document: &Html, key: &str) -> Option<String> {
    ["property", "name"].into_iter().find_map(|attr| {
        document.select(&META).find_map(|element| {
            let value = element.value();
            let matches = value.attr(attr).is_some_and(|a| a.trim().eq_ignore_ascii_case(key));
            if !matches {
                return None;
            }
            non_empty(value.attr("content"))
        })
    })
}

fn title_text(document: &Html) -> Option<String> {
    document
        .select(&TITLE)
        .map(|element| element.text().collect::<String>())
        .find_map(|text| non_empty(Some(text.as_str())))
}

fn favicon(document: &Html, target: &Url) -> String {
    ICON_RELS
        .iter()
        .find_map(|rels| {
            document
                .select(&LINK)
                .filter(|element| rel_matches(element, rels))
                .find_map(|element| non_empty(element.value().attr("href")))
        })
        .map(|href| resolve_url(&href, target))
        .unwrap_or_else(|| format!("{}/favicon.ico", origin_of(target)))
}

fn rel_matches(element: &ElementRef<'_>, rels: &[&str]) -> bool {
    element.value().attr("rel").is_some_and(|rel| {
        let normalized = rel.split_whitespace().collect::<Vec<_>>().join(" ").to_ascii_lowercase();
        rels.contains(&normalized.as_str())
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(String::from)
}
