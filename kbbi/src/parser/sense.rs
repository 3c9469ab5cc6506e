//! Sense extraction.

use scraper::{ElementRef, Node};

use super::roles::{
    find_all, find_tag, is_tag, label_with_number, split_semicolons, subtree, visible_text, Role,
};
use crate::model::{Sense, WordClass};

const CROSS_REFERENCE_ARROW: &str = "→";
const PROPOSAL_PLACEHOLDER: &str = "Usulkan makna baru";

/// Extracts the senses of one entry fragment.
///
/// A prakategorial marker anywhere in the fragment replaces the whole list
/// with the single sense it carries.
pub(super) fn parse_senses(fragment: &[ElementRef<'_>], authenticated: bool) -> Vec<Sense> {
    let mut elements = fragment.iter().flat_map(|el| subtree(*el));
    if let Some(marker) = elements.find(|el| Role::Prakategorial.matches(el)) {
        return vec![prakategorial_sense(&marker)];
    }

    fragment
        .iter()
        .flat_map(|el| subtree(*el))
        .filter(|el| is_tag(el, "li"))
        .filter(|item| {
            let text = visible_text(item);
            !(authenticated && text.contains(PROPOSAL_PLACEHOLDER))
                && !text.trim().starts_with(CROSS_REFERENCE_ARROW)
        })
        .map(|item| parse_sense(&item))
        .filter(|sense| !sense.subsenses.is_empty() && !is_bare_cross_reference(sense))
        .collect()
}

fn is_bare_cross_reference(sense: &Sense) -> bool {
    sense.word_classes.is_empty()
        && sense
            .subsenses
            .iter()
            .all(|sub| sub.starts_with(CROSS_REFERENCE_ARROW))
}

fn parse_sense(item: &ElementRef<'_>) -> Sense {
    let word_classes: Vec<WordClass> = find_all(*item, Role::WordClass)
        .flat_map(|container| find_tag(container, "span"))
        .filter_map(|span| {
            let code = visible_text(&span).trim().to_string();
            (!code.is_empty()).then(|| word_class(code, span.value().attr("title")))
        })
        .collect();

    let note = find_all(*item, Role::Note)
        .map(|el| visible_text(&el))
        .collect::<String>()
        .trim()
        .to_string();
    let note = if word_classes.iter().any(|class| class.code == note) {
        String::new()
    } else {
        note
    };

    let subsenses = match cross_reference(item) {
        Some(reference) => vec![reference],
        None => definition_text(item),
    };

    Sense {
        word_classes,
        subsenses,
        note,
        examples: examples(item),
    }
}

fn prakategorial_sense(marker: &ElementRef<'_>) -> Sense {
    let code = visible_text(marker).trim().to_string();
    let subsenses = marker
        .next_sibling()
        .and_then(|node| match node.value() {
            Node::Text(text) => Some(text.trim().to_string()),
            _ => None,
        })
        .filter(|text| !text.is_empty())
        .into_iter()
        .collect();

    Sense {
        word_classes: vec![word_class(code, marker.value().attr("title"))],
        subsenses,
        note: String::new(),
        examples: examples(marker),
    }
}

/// Builds a word class from its code and a `"name: description"` title.
fn word_class(code: String, title: Option<&str>) -> WordClass {
    let mut parts = title.unwrap_or_default().split(": ");
    let name = parts.next().unwrap_or_default().trim().to_string();
    let description = parts.next().unwrap_or_default().trim().to_string();
    WordClass {
        code,
        name,
        description,
    }
}

/// `→ target (n)` when the item's own text is a single link.
///
/// Prose with inline links, several links, or a link carrying a class
/// marker is a definition instead.
fn cross_reference(item: &ElementRef<'_>) -> Option<String> {
    let mut links = find_tag(*item, "a");
    let link = links.next()?;
    if links.next().is_some() || find_all(link, Role::ClassMarker).next().is_some() {
        return None;
    }
    (own_text(item).trim() == visible_text(&link).trim())
        .then(|| format!("{CROSS_REFERENCE_ARROW} {}", label_with_number(&link)))
}

/// Item text outside colour-coded `font` children, split into subsenses.
fn definition_text(item: &ElementRef<'_>) -> Vec<String> {
    let text = own_text(item);
    let text = text.trim();
    let text = text.strip_suffix(':').unwrap_or(text);
    if text.is_empty() {
        Vec::new()
    } else {
        split_semicolons(text)
    }
}

/// Text of the item itself, without `font` annotations or controls.
fn own_text(item: &ElementRef<'_>) -> String {
    let mut text = String::new();
    for child in item.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(_) => {
                if let Some(el) = ElementRef::wrap(child) {
                    if !is_tag(&el, "font") && !Role::ControlButton.matches(&el) {
                        text.push_str(&visible_text(&el));
                    }
                }
            }
            _ => {}
        }
    }
    text
}

/// Text after the first `": "`, split on `"; "`.
fn examples(el: &ElementRef<'_>) -> Vec<String> {
    let full = visible_text(el);
    match full.split_once(": ") {
        Some((_, rest)) if !rest.trim().is_empty() => split_semicolons(rest.trim()),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    fn senses(html: &str, authenticated: bool) -> Vec<Sense> {
        let doc = Html::parse_fragment(html);
        let fragment: Vec<_> = doc.root_element().child_elements().collect();
        parse_senses(&fragment, authenticated)
    }

    const NOUN: &str =
        r#"<font color="red"><i><span title="Nomina: kata benda">n</span></i></font>"#;

    #[test]
    fn test_sense_with_class_and_examples() {
        let html = format!(
            r#"<ol><li>{NOUN} bangunan untuk tempat tinggal: <font color="grey"><i>rumah itu besar; rumah baru</i></font></li></ol>"#
        );
        let parsed = senses(&html, false);
        assert_eq!(parsed.len(), 1);
        assert_eq!(
            parsed[0].word_classes,
            vec![WordClass {
                code: "n".into(),
                name: "Nomina".into(),
                description: "kata benda".into(),
            }]
        );
        assert_eq!(parsed[0].subsenses, vec!["bangunan untuk tempat tinggal"]);
        assert_eq!(parsed[0].examples, vec!["rumah itu besar", "rumah baru"]);
    }

    #[test]
    fn test_semicolons_split_subsenses() {
        let html = format!("<ol><li>{NOUN} kediaman; tempat tinggal</li></ol>");
        let parsed = senses(&html, false);
        assert_eq!(parsed[0].subsenses, vec!["kediaman", "tempat tinggal"]);
        assert!(parsed[0].examples.is_empty());
    }

    #[test]
    fn test_note_is_kept_unless_it_repeats_a_code() {
        let html = format!(
            r#"<ol><li>{NOUN} <font color="green"><i>ki</i></font> keluarga</li><li>{NOUN} <font color="green">n</font> benda</li></ol>"#
        );
        let parsed = senses(&html, false);
        assert_eq!(parsed[0].note, "ki");
        assert_eq!(parsed[0].subsenses, vec!["keluarga"]);
        assert_eq!(parsed[1].note, "");
    }

    #[test]
    fn test_bare_cross_reference_is_dropped() {
        let html = r#"<ol><li><a href="/entri/rumah">rumah<sup>1</sup></a></li><li>→ <a href="/entri/wisma">wisma</a></li></ol>"#;
        assert!(senses(html, false).is_empty());
    }

    #[test]
    fn test_classified_cross_reference_is_kept() {
        let html = format!(r#"<ol><li>{NOUN} <a href="/entri/rumah">rumah<sup>1</sup></a></li></ol>"#);
        let parsed = senses(&html, false);
        assert_eq!(parsed[0].subsenses, vec!["→ rumah (1)"]);
    }

    #[test]
    fn test_inline_links_keep_the_definition() {
        let html = format!(
            r#"<ol><li>{NOUN} bangunan tempat tinggal, seperti <a href="/entri/wisma">wisma</a> atau <a href="/entri/graha">graha</a></li><li>{NOUN} lihat <a href="/entri/umah">umah</a></li></ol>"#
        );
        let parsed = senses(&html, false);
        assert_eq!(
            parsed[0].subsenses,
            vec!["bangunan tempat tinggal, seperti wisma atau graha"]
        );
        assert_eq!(parsed[1].subsenses, vec!["lihat umah"]);
    }

    #[test]
    fn test_class_marked_link_is_not_a_cross_reference() {
        let html = r#"<ol><li><a href="/x"><span style="color:red">v</span></a> berjalan</li></ol>"#;
        let parsed = senses(html, false);
        assert_eq!(parsed[0].subsenses, vec!["v berjalan"]);
    }

    #[test]
    fn test_proposal_placeholder_only_skipped_when_authenticated() {
        let html = "<ol><li>Usulkan makna baru</li></ol>";
        assert!(senses(html, true).is_empty());
        assert_eq!(senses(html, false)[0].subsenses, vec!["Usulkan makna baru"]);
    }

    #[test]
    fn test_control_buttons_are_ignored() {
        let html = format!(
            r#"<ol><li>{NOUN} rumah <span class="entrisButton">Tambah</span>besar</li></ol>"#
        );
        let parsed = senses(&html, false);
        assert_eq!(parsed[0].subsenses, vec!["rumah besar"]);
    }

    #[test]
    fn test_prakategorial_short_circuits() {
        let html = r#"<font color="darkgreen" title="prakategorial: tidak dipakai dalam bentuk dasar">prakat</font> cak, lihat bacak<ol><li>diabaikan</li></ol>"#;
        let parsed = senses(html, false);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].word_classes[0].code, "prakat");
        assert_eq!(parsed[0].word_classes[0].name, "prakategorial");
        assert_eq!(parsed[0].subsenses, vec!["cak, lihat bacak"]);
    }

    #[test]
    fn test_empty_item_is_dropped() {
        assert!(senses(&format!("<ol><li>{NOUN}</li></ol>"), false).is_empty());
    }
}
