//! HTML text extraction
//!
//! Applies a tag/class [`Selector`] to a fetched document and joins the text
//! of every match, in document order, with `", "`.
//!
//! Documents are decoded before parsing. The encoding is taken from, in order:
//! a byte order mark, the `Content-Type` charset, a `<meta>` charset
//! declaration near the top of the document, and finally UTF-8.

use crate::harvest::fetcher::FetchedPage;
use crate::model::Selector;
use encoding_rs::{Encoding, UTF_8};
use scraper::{ElementRef, Html, Selector as CssSelector};
use std::borrow::Cow;

/// Separator placed between the text of consecutive matches
pub const MATCH_SEPARATOR: &str = ", ";

/// How far into a document a `<meta>` charset declaration is looked for
const META_SNIFF_LIMIT: usize = 1024;

/// Extracts the text of every element matching `selector` from a fetched page
///
/// The `Content-Type` charset of the response takes part in decoding.
pub fn extract_page(page: &FetchedPage, selector: &Selector) -> String {
    extract_with_charset(&page.body, page.charset(), selector)
}

/// Extracts the text of every element matching `selector` from `document`
///
/// The document's own `<meta>` charset is honoured; without one it is read as
/// UTF-8. Text is the full, untrimmed descendant text of each match.
///
/// Never fails: an unusable selector or a document without matches yields an
/// empty string.
///
/// # Example
///
/// ```
/// use sumi_glean::harvest::extract;
/// use sumi_glean::model::Selector;
///
/// let html = br#"<h2 class="title">Foo</h2><h2>Skip</h2><h2 class="title big">Bar</h2>"#;
/// let selector = Selector::new("h2", Some("title")).unwrap();
/// assert_eq!(extract(html, &selector), "Foo, Bar");
/// ```
pub fn extract(document: &[u8], selector: &Selector) -> String {
    extract_with_charset(document, None, selector)
}

/// Like [`extract`], with the charset announced by the transport
pub fn extract_with_charset(document: &[u8], charset: Option<&str>, selector: &Selector) -> String {
    let css = match CssSelector::parse(selector.tag_name()) {
        Ok(css) => css,
        Err(e) => {
            tracing::warn!("Unusable selector '{}': {:?}", selector, e);
            return String::new();
        }
    };

    let html = decode_document(document, charset);
    let document = Html::parse_document(&html);

    document
        .select(&css)
        .filter(|element| has_class(element, selector.class_name()))
        .map(|element| element.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(MATCH_SEPARATOR)
}

/// Decodes a document to text
///
/// A byte order mark wins over any declared charset. Unknown labels are
/// ignored; malformed sequences become U+FFFD.
pub fn decode_document<'a>(document: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let encoding = charset
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .or_else(|| sniff_meta_charset(document))
        .map(Encoding::output_encoding)
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(document);
    if had_errors {
        tracing::debug!("Document is not valid {}; replaced bad sequences", used.name());
    }
    text
}

/// Looks for `<meta charset=...>` or `<meta http-equiv=... content="...; charset=...">`
fn sniff_meta_charset(document: &[u8]) -> Option<&'static Encoding> {
    let head = &document[..document.len().min(META_SNIFF_LIMIT)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();

    let mut rest = head.as_str();
    while let Some(start) = rest.find("<meta") {
        let tag = &rest[start..];
        let tag = &tag[..tag.find('>').unwrap_or(tag.len())];

        if let Some(pos) = tag.find("charset") {
            let value = tag[pos + "charset".len()..]
                .trim_start()
                .strip_prefix('=')
                .map(|v| v.trim_start().trim_start_matches(['"', '\'']))
                .unwrap_or_default();
            let label: String = value
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
                .collect();
            if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
                return Some(encoding);
            }
        }

        rest = &rest[start + "<meta".len()..];
    }
    None
}

/// Checks the class filter of a selector against an element
///
/// Matches when the class is one of the element's classes, or when it equals
/// the element's entire `class` attribute.
fn has_class(element: &ElementRef<'_>, class_name: Option<&str>) -> bool {
    let Some(class_name) = class_name else {
        return true;
    };

    let value = element.value();
    value.classes().any(|c| c == class_name) || value.attr("class") == Some(class_name)
}
