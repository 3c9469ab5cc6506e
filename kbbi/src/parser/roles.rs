//! Semantic roles of presentation markup.
//!
//! The site encodes meaning in colours, inline styles and class names. Every
//! such convention the parser depends on is recognised here and nowhere
//! else.

use scraper::node::Element;
use scraper::CaseSensitivity;
use scraper::{ElementRef, Node};

/// Meaning carried by an element's presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Container of word-class tags in a sense (`color="red"`).
    WordClass,
    /// Usage note in a sense (`color="green"`).
    Note,
    /// Prakategorial marker (`color="darkgreen"`).
    Prakategorial,
    /// Red-styled span, marks a word-class tag inside a link.
    ClassMarker,
    /// Source language in an etymology (`i`, dark red).
    EtymologyLanguage,
    /// Word class in an etymology (`span`, red).
    EtymologyClass,
    /// Source form in an etymology (`b`).
    EtymologyOrigin,
    /// Pronunciation in an etymology (`span`, dark green).
    EtymologyPronunciation,
    /// UI-only control such as the "add to list" button.
    ControlButton,
    /// Link to the root word in an entry heading.
    RootWord,
    /// Syllabified pronunciation in an entry heading.
    Syllable,
    /// One "did you mean" suggestion.
    Suggestion,
    /// Heading of an appendix rather than an entry.
    AppendixHeading,
    /// Unstyled rule that ends the entry list.
    SegmentEnd,
}

impl Role {
    /// Whether `el` plays this role.
    #[must_use]
    pub fn matches(self, el: &ElementRef<'_>) -> bool {
        let e = el.value();
        match self {
            Self::WordClass => color_attr(e) == Some("red"),
            Self::Note => color_attr(e) == Some("green"),
            Self::Prakategorial => color_attr(e) == Some("darkgreen"),
            Self::ClassMarker | Self::EtymologyClass => {
                e.name() == "span" && style_contains(e, "color:red")
            }
            Self::EtymologyLanguage => e.name() == "i" && style_contains(e, "color:darkred"),
            Self::EtymologyOrigin => e.name() == "b",
            Self::EtymologyPronunciation => {
                e.name() == "span" && style_contains(e, "color:darkgreen")
            }
            Self::ControlButton => e.name() == "span" && has_class(e, "entrisButton"),
            Self::RootWord => has_class(e, "rootword"),
            Self::Syllable => has_class(e, "syllable"),
            Self::Suggestion => has_class(e, "col-md-3"),
            Self::AppendixHeading => e.name() == "h2" && normalized_style(e) == "color:gray",
            Self::SegmentEnd => e.name() == "hr" && normalized_style(e).is_empty(),
        }
    }
}

fn color_attr(e: &Element) -> Option<&str> {
    e.attr("color").map(str::trim)
}

fn normalized_style(e: &Element) -> String {
    e.attr("style")
        .unwrap_or_default()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_end_matches(';')
        .to_string()
}

fn style_contains(e: &Element, needle: &str) -> bool {
    normalized_style(e).contains(needle)
}

fn has_class(e: &Element, class: &str) -> bool {
    e.has_class(class, CaseSensitivity::CaseSensitive)
}

/// Whether `el` is a `<tag>` element.
#[must_use]
pub fn is_tag(el: &ElementRef<'_>, tag: &str) -> bool {
    el.value().name() == tag
}

/// `el` and every element below it, in document order.
pub fn subtree<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().filter_map(ElementRef::wrap)
}

/// Elements strictly below `el` that play `role`.
pub fn find_all<'a>(el: ElementRef<'a>, role: Role) -> impl Iterator<Item = ElementRef<'a>> {
    subtree(el).skip(1).filter(move |e| role.matches(e))
}

/// Elements strictly below `el` named `tag`.
pub fn find_tag<'a>(el: ElementRef<'a>, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> {
    subtree(el).skip(1).filter(move |e| is_tag(e, tag))
}

/// The next element sibling of `el`, skipping text.
#[must_use]
pub fn next_element<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.next_siblings().find_map(ElementRef::wrap)
}

/// Text below `el`, leaving out UI-only control spans.
#[must_use]
pub fn visible_text(el: &ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_visible(el, &mut out);
    out
}

fn collect_visible(el: &ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child_ref) = ElementRef::wrap(child) {
                    if !Role::ControlButton.matches(&child_ref) {
                        collect_visible(&child_ref, out);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Trimmed direct text children of `el`, joined by single spaces.
#[must_use]
pub fn direct_text(el: &ElementRef<'_>) -> String {
    el.children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Direct text of `el` with its superscript number, e.g. `rumah (1)`.
#[must_use]
pub fn label_with_number(el: &ElementRef<'_>) -> String {
    let label = direct_text(el);
    match find_tag(*el, "sup").next() {
        Some(sup) => format!("{label} ({})", visible_text(&sup).trim()),
        None => label,
    }
}

/// Splits `text` on `"; "`, trimming each piece.
#[must_use]
pub fn split_semicolons(text: &str) -> Vec<String> {
    text.split("; ").map(|part| part.trim().to_string()).collect()
}
