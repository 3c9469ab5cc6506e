//! Entry heading and related-word extraction.

use scraper::ElementRef;

use super::etymology::parse_etymology;
use super::roles::{
    direct_text, find_all, find_tag, is_tag, label_with_number, next_element, subtree,
    visible_text, Role,
};
use super::sense::parse_senses;
use crate::model::Entry;

const VARIANT_PREFIX: &str = "varian: ";
const DERIVED_WORDS_LABEL: &str = "Kata Turunan";
const COMPOUND_WORDS_LABEL: &str = "Gabungan Kata";

/// Parses one entry fragment, whose first element is its heading.
///
/// Returns `None` when no headword can be read.
pub(super) fn parse_entry(fragment: &[ElementRef<'_>], authenticated: bool) -> Option<Entry> {
    let heading = fragment.first()?;
    let headword = headword(heading);
    if headword.is_empty() {
        return None;
    }

    let mut entry = Entry {
        headword,
        disambiguation_number: homonym_number(heading),
        base_words: find_all(*heading, Role::RootWord)
            .flat_map(|root| find_tag(root, "a"))
            .map(|link| label_with_number(&link))
            .collect(),
        pronunciation: find_all(*heading, Role::Syllable)
            .next()
            .map(|el| visible_text(&el).trim().to_string())
            .unwrap_or_default(),
        ..Entry::default()
    };
    read_variants(heading, authenticated, &mut entry);

    if authenticated {
        entry.etymology = parse_etymology(fragment);
        entry.derived_words = related_terms(fragment, DERIVED_WORDS_LABEL);
        entry.compound_words = related_terms(fragment, COMPOUND_WORDS_LABEL);
    }
    entry.senses = parse_senses(fragment, authenticated);

    Some(entry)
}

/// Italic text when the heading has any, otherwise its direct text.
fn headword(heading: &ElementRef<'_>) -> String {
    let italic: String = find_tag(*heading, "i")
        .map(|el| visible_text(&el))
        .collect();
    let italic = italic.trim();
    if italic.is_empty() {
        direct_text(heading)
    } else {
        italic.to_string()
    }
}

/// The heading's own superscript; numbers on root-word links belong to
/// those links.
fn homonym_number(heading: &ElementRef<'_>) -> String {
    find_tag(*heading, "sup")
        .find(|sup| {
            !sup.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| Role::RootWord.matches(&el))
        })
        .map(|sup| visible_text(&sup).trim().to_string())
        .unwrap_or_default()
}

/// Fills either the nonstandard forms or the variants from a `small` block.
///
/// Logged-in pages put a control button in an extra `small`; the last one
/// without a button is used there. Otherwise the first `small` is used.
fn read_variants(heading: &ElementRef<'_>, authenticated: bool, entry: &mut Entry) {
    let mut smalls = find_tag(*heading, "small");
    let block = if authenticated {
        smalls
            .filter(|small| find_all(*small, Role::ControlButton).next().is_none())
            .last()
    } else {
        smalls.next()
    };
    let Some(block) = block else {
        return;
    };

    let bold: Vec<_> = find_tag(block, "b").collect();
    if !bold.is_empty() {
        entry.nonstandard_forms = bold
            .iter()
            .map(|b| {
                label_with_number(b)
                    .trim_start_matches([',', ' '])
                    .to_string()
            })
            .filter(|form| !form.is_empty())
            .collect();
        return;
    }

    let text = visible_text(&block);
    if let Some(list) = text.trim().strip_prefix(VARIANT_PREFIX) {
        entry.variants = list.split(", ").map(|v| v.trim().to_string()).collect();
    }
}

/// Link texts in the element after each `h4` whose text contains `label`.
pub(super) fn related_terms(scope: &[ElementRef<'_>], label: &str) -> Vec<String> {
    scope
        .iter()
        .flat_map(|el| subtree(*el))
        .filter(|el| is_tag(el, "h4") && visible_text(el).contains(label))
        .filter_map(|heading| next_element(&heading))
        .flat_map(|list| find_tag(list, "a"))
        .map(|link| visible_text(&link).trim().to_string())
        .filter(|term| !term.is_empty())
        .collect()
}
