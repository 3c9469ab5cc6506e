//! Etymology block extraction.

use scraper::{ElementRef, Node};

use super::roles::{find_all, next_element, split_semicolons, subtree, visible_text, Role};
use crate::model::Etymology;

const ETYMOLOGY_LABEL: &str = "Etimologi:";

/// Finds the block following the `Etimologi:` label and parses it.
///
/// The label is the innermost element whose text carries it; the block is
/// its next element sibling.
pub(super) fn parse_etymology(fragment: &[ElementRef<'_>]) -> Option<Etymology> {
    let label = fragment
        .iter()
        .flat_map(|el| subtree(*el))
        .find(|el| contains_label(el) && !el.child_elements().any(|c| contains_label(&c)))?;
    let block = next_element(&label)?;
    let etymology = parse_block(&block);
    (etymology != Etymology::default()).then_some(etymology)
}

fn contains_label(el: &ElementRef<'_>) -> bool {
    el.text().collect::<String>().contains(ETYMOLOGY_LABEL)
}

fn parse_block(block: &ElementRef<'_>) -> Etymology {
    let last_text = |role: Role| {
        find_all(*block, role)
            .last()
            .map(|el| visible_text(&el).trim().to_string())
            .unwrap_or_default()
    };

    let word_classes = find_all(*block, Role::EtymologyClass)
        .map(|el| visible_text(&el).trim().to_string())
        .filter(|class| !class.is_empty())
        .collect();

    let mut rest = String::new();
    collect_unmarked(block, &mut rest);
    let rest = rest.trim_matches(|c: char| c.is_whitespace() || matches!(c, '[' | ']' | '\'' | '"'));
    let meanings = if rest.is_empty() {
        Vec::new()
    } else {
        split_semicolons(rest)
    };

    Etymology {
        word_classes,
        origin_language: last_text(Role::EtymologyLanguage),
        origin_form: last_text(Role::EtymologyOrigin),
        pronunciation: last_text(Role::EtymologyPronunciation),
        meanings,
    }
}

/// Text of `el` outside every role-coded etymology element.
fn collect_unmarked(el: &ElementRef<'_>, out: &mut String) {
    const MARKED: [Role; 4] = [
        Role::EtymologyLanguage,
        Role::EtymologyClass,
        Role::EtymologyOrigin,
        Role::EtymologyPronunciation,
    ];
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    if !MARKED.iter().any(|role| role.matches(&child_ref)) {
                        collect_unmarked(&child_ref, out);
                    }
                }
            }
            _ => {}
        }
    }
}
