//! Structural parser: dictionary page markup to a [`SearchResult`].
//!
//! The page is loaded as a whole document and split into one fragment per
//! entry. Every presentational convention used along the way lives in
//! [`roles`].
//!
//! # Example
//!
//! ```rust
//! use kbbi::parser::parse;
//!
//! let html = r#"<hr style="margin:0"><h2>rumah</h2><ol><li>tempat tinggal</li></ol><hr>"#;
//! let result = parse(html, false);
//! assert_eq!(result.entries[0].headword, "rumah");
//! ```

mod entry;
mod etymology;
pub mod roles;
mod sense;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::errors::{KbbiError, Result};
use crate::model::SearchResult;
use entry::{parse_entry, related_terms};
use roles::{find_all, is_tag, subtree, visible_text, Role};

/// Phrase announcing a "did you mean" list instead of entries.
pub const SUGGESTION_MARKER: &str = "Berikut beberapa saran entri lain yang mirip.";

const PROVERBS_LABEL: &str = "Peribahasa";
const IDIOMS_LABEL: &str = "Idiom";

/// Parses page markup.
///
/// Irregular markup degrades to empty or partial fields; this never fails.
/// Authentication-only fields (etymology, related words, proverbs, idioms)
/// are extracted only when `authenticated` is set. The canonical link is
/// left empty; see [`SearchResult::set_link`].
#[must_use]
pub fn parse(html: &str, authenticated: bool) -> SearchResult {
    let document = Html::parse_document(html);

    if html.contains(SUGGESTION_MARKER) {
        let suggestions: Vec<String> = find_all(document.root_element(), Role::Suggestion)
            .map(|el| visible_text(&el).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        debug!(count = suggestions.len(), "Parsed suggestion list");
        return SearchResult {
            suggestions,
            ..SearchResult::default()
        };
    }

    let mut entries: Vec<_> = segment(&document)
        .iter()
        .filter_map(|fragment| parse_entry(fragment, authenticated))
        .collect();

    if authenticated {
        let root = [document.root_element()];
        let proverbs = related_terms(&root, PROVERBS_LABEL);
        let idioms = related_terms(&root, IDIOMS_LABEL);
        for entry in &mut entries {
            entry.proverbs.clone_from(&proverbs);
            entry.idioms.clone_from(&idioms);
        }
    }

    debug!(entries = entries.len(), authenticated, "Parsed entry page");
    SearchResult {
        entries,
        ..SearchResult::default()
    }
}

/// Parses raw response bytes.
///
/// # Errors
///
/// Returns `KbbiError::Parse` when the bytes are not UTF-8 and so cannot be
/// loaded as a document.
pub fn parse_bytes(bytes: &[u8], authenticated: bool) -> Result<SearchResult> {
    let html = std::str::from_utf8(bytes)
        .map_err(|e| KbbiError::Parse(format!("markup is not valid UTF-8: {e}")))?;
    Ok(parse(html, authenticated))
}

/// Splits the document into entry fragments, each starting at its `h2`.
///
/// Scanning starts after the first `hr` and stops at an unstyled `hr`.
/// Appendix headings and anything before the first heading are skipped.
fn segment(document: &Html) -> Vec<Vec<ElementRef<'_>>> {
    let Some(start) = subtree(document.root_element()).find(|el| is_tag(el, "hr")) else {
        return Vec::new();
    };

    let mut fragments = Vec::new();
    let mut current: Option<Vec<ElementRef<'_>>> = None;
    for el in start.next_siblings().filter_map(ElementRef::wrap) {
        if Role::SegmentEnd.matches(&el) {
            break;
        }
        if is_tag(&el, "h2") {
            fragments.extend(current.take());
            if !Role::AppendixHeading.matches(&el) {
                current = Some(vec![el]);
            }
            continue;
        }
        if let Some(fragment) = current.as_mut() {
            fragment.push(el);
        }
    }
    fragments.extend(current);
    fragments
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(body: &str) -> String {
        format!(r#"<html><body><div class="container"><hr style="margin:0">{body}</div></body></html>"#)
    }

    #[test]
    fn test_suggestions_short_circuit() {
        let html = format!(
            r#"<html><body><h4>Entri tidak ditemukan.</h4><p>{SUGGESTION_MARKER}</p><div class="col-md-3"> rumah </div><div class="col-md-3">ramah</div><div class="col-md-3"> </div></body></html>"#
        );
        let result = parse(&html, false);
        assert!(result.entries.is_empty());
        assert_eq!(result.suggestions, vec!["rumah", "ramah"]);
    }

    #[test]
    fn test_segments_on_headings() {
        let html = page(
            "<h2>ban <sup>1</sup></h2><ol><li>lingkaran karet</li></ol>\
             <h2>ban <sup>2</sup></h2><ol><li>jalur</li></ol>",
        );
        let result = parse(&html, false);
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].disambiguation_number, "1");
        assert_eq!(result.entries[0].senses[0].subsenses, vec!["lingkaran karet"]);
        assert_eq!(result.entries[1].senses[0].subsenses, vec!["jalur"]);
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_unstyled_rule_ends_entries() {
        let html = page("<h2>ban</h2><ol><li>karet</li></ol><hr><h2>iklan</h2><ol><li>x</li></ol>");
        let result = parse(&html, false);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].senses.len(), 1);
    }

    #[test]
    fn test_appendix_heading_is_skipped() {
        let html = page(
            r#"<h2>ban</h2><ol><li>karet</li></ol><h2 style="color:gray">Lampiran</h2><ol><li>x</li></ol>"#,
        );
        let result = parse(&html, false);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].headword, "ban");
    }

    #[test]
    fn test_no_rule_means_no_entries() {
        let result = parse("<html><body><h2>ban</h2></body></html>", false);
        assert!(result.entries.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_proverbs_and_idioms_are_shared_when_authenticated() {
        let html = page(
            "<h2>rumah <sup>1</sup></h2><ol><li>tempat</li></ol>\
             <h2>rumah <sup>2</sup></h2><ol><li>wadah</li></ol>\
             <h4>Peribahasa</h4><ul><li><a>rumah sudah, tukul berbunyi</a></li></ul>\
             <h4>Idiom</h4><ul><li><a>rumah tangga</a></li></ul>",
        );
        let result = parse(&html, true);
        assert_eq!(result.entries.len(), 2);
        for entry in &result.entries {
            assert_eq!(entry.proverbs, vec!["rumah sudah, tukul berbunyi"]);
            assert_eq!(entry.idioms, vec!["rumah tangga"]);
        }

        let result = parse(&html, false);
        assert!(result.entries.iter().all(|e| e.proverbs.is_empty() && e.idioms.is_empty()));
    }

    #[test]
    fn test_parse_bytes_rejects_invalid_utf8() {
        assert!(matches!(
            parse_bytes(&[0xff, 0xfe, 0x00], false),
            Err(KbbiError::Parse(_))
        ));
        let html = page("<h2>ban</h2><ol><li>karet</li></ol>");
        assert_eq!(parse_bytes(html.as_bytes(), false).unwrap().entries.len(), 1);
    }
}
