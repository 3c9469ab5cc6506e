//! Data model for parsed dictionary content.
//!
//! Serialized field names follow the site's own vocabulary so that machine
//! consumers get the same JSON shape regardless of which client produced it.
//! Lists that only an authenticated session can fill are omitted from the
//! JSON when empty.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::Result;

/// Canonical prefix of entry links.
pub const ENTRY_LINK_PREFIX: &str = "https://kbbi.kemdikbud.go.id/entri/";

/// Result of looking up one term.
///
/// Either `entries` or `suggestions` is filled, never both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Canonical link of the looked-up term.
    #[serde(rename = "pranala")]
    pub canonical_link: String,
    /// Entries found for the term.
    #[serde(rename = "entri")]
    pub entries: Vec<Entry>,
    /// Similar terms offered when the term has no entry.
    #[serde(rename = "saran_entri", default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// One headword's dictionary record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The headword.
    #[serde(rename = "nama")]
    pub headword: String,
    /// Homograph number, empty when the headword is unique.
    #[serde(rename = "nomor")]
    pub disambiguation_number: String,
    /// Root words this entry derives from.
    #[serde(rename = "kata_dasar")]
    pub base_words: Vec<String>,
    /// Accepted spelling variants.
    #[serde(rename = "varian")]
    pub variants: Vec<String>,
    /// Nonstandard forms; when present, `variants` is left empty.
    #[serde(rename = "bentuk_tidak_baku", default, skip_serializing_if = "Vec::is_empty")]
    pub nonstandard_forms: Vec<String>,
    /// Syllabified pronunciation.
    #[serde(rename = "pelafalan")]
    pub pronunciation: String,
    /// Meanings of the entry.
    #[serde(rename = "makna")]
    pub senses: Vec<Sense>,
    /// Word origin, only available to authenticated sessions.
    #[serde(rename = "etimologi", default, skip_serializing_if = "Option::is_none")]
    pub etymology: Option<Etymology>,
    /// Derived words.
    #[serde(rename = "kata_turunan", default, skip_serializing_if = "Vec::is_empty")]
    pub derived_words: Vec<String>,
    /// Compound words.
    #[serde(rename = "gabungan_kata", default, skip_serializing_if = "Vec::is_empty")]
    pub compound_words: Vec<String>,
    /// Proverbs containing the headword.
    #[serde(rename = "peribahasa", default, skip_serializing_if = "Vec::is_empty")]
    pub proverbs: Vec<String>,
    /// Idioms containing the headword.
    #[serde(rename = "idiom", default, skip_serializing_if = "Vec::is_empty")]
    pub idioms: Vec<String>,
}

/// One meaning within an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Grammatical categories of this meaning.
    #[serde(rename = "kelas")]
    pub word_classes: Vec<WordClass>,
    /// Sub-meanings, or `"→ target"` cross-references.
    #[serde(rename = "submakna")]
    pub subsenses: Vec<String>,
    /// Usage note such as a domain label.
    #[serde(rename = "info")]
    pub note: String,
    /// Usage examples.
    #[serde(rename = "contoh")]
    pub examples: Vec<String>,
}

/// A grammatical category tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordClass {
    /// Abbreviation, e.g. `n`.
    #[serde(rename = "kode")]
    pub code: String,
    /// Full name, e.g. `Nomina`.
    #[serde(rename = "nama")]
    pub name: String,
    /// Explanation of the category.
    #[serde(rename = "deskripsi")]
    pub description: String,
}

/// Origin of a headword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Etymology {
    /// Word classes in the source language.
    #[serde(rename = "kelas")]
    pub word_classes: Vec<String>,
    /// Source language.
    #[serde(rename = "bahasa")]
    pub origin_language: String,
    /// Form in the source language.
    #[serde(rename = "asal_kata")]
    pub origin_form: String,
    /// Pronunciation of the source form.
    #[serde(rename = "pelafalan")]
    pub pronunciation: String,
    /// Meanings in the source language.
    #[serde(rename = "arti")]
    pub meanings: Vec<String>,
}

impl SearchResult {
    /// Whether the result carries suggestions instead of entries.
    #[must_use]
    pub fn is_suggestion_only(&self) -> bool {
        self.entries.is_empty() && !self.suggestions.is_empty()
    }

    /// Assigns the canonical link for the looked-up term.
    pub fn set_link(&mut self, term: &str) {
        self.canonical_link = format!("{ENTRY_LINK_PREFIX}{term}");
    }

    /// Drops usage examples from every sense.
    pub fn strip_examples(&mut self) {
        for sense in self.entries.iter_mut().flat_map(|e| e.senses.iter_mut()) {
            sense.examples.clear();
        }
    }

    /// Drops derived words, compounds, proverbs and idioms.
    pub fn strip_related(&mut self) {
        for entry in &mut self.entries {
            entry.derived_words.clear();
            entry.compound_words.clear();
            entry.proverbs.clear();
            entry.idioms.clear();
        }
    }

    /// Serializes the result to JSON.
    pub fn to_json(&self, indent: bool) -> Result<String> {
        let json = if indent {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_suggestion_only() {
            return write!(
                f,
                "Berikut beberapa saran entri lain yang mirip.\n{}",
                self.suggestions.join(", ")
            );
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut title = self.headword.clone();
        if !self.disambiguation_number.is_empty() {
            title.push_str(&format!(" ({})", self.disambiguation_number));
        }
        if !self.base_words.is_empty() {
            title = format!("{} » {title}", self.base_words.join(" » "));
        }
        if !self.pronunciation.is_empty() {
            title.push_str(&format!("  {}", self.pronunciation));
        }
        write!(f, "{title}")?;

        if !self.nonstandard_forms.is_empty() {
            write!(f, "\nbentuk tidak baku: {}", self.nonstandard_forms.join(", "))?;
        } else if !self.variants.is_empty() {
            write!(f, "\nvarian: {}", self.variants.join(", "))?;
        }

        if let Some(ref etymology) = self.etymology {
            write!(f, "\nEtimologi: {etymology}")?;
        }

        if self.senses.len() > 1 {
            for (i, sense) in self.senses.iter().enumerate() {
                write!(f, "\n{}. {sense}", i + 1)?;
            }
        } else if let Some(sense) = self.senses.first() {
            write!(f, "\n{sense}")?;
        }

        let bare = self.headword.replace('.', "");
        if !self.derived_words.is_empty() {
            write!(f, "\n\nKata Turunan\n{}", self.derived_words.join("; "))?;
        }
        if !self.compound_words.is_empty() {
            write!(f, "\n\nGabungan Kata\n{}", self.compound_words.join("; "))?;
        }
        if !self.proverbs.is_empty() {
            write!(
                f,
                "\n\nPeribahasa (mengandung [{bare}])\n{}",
                self.proverbs.join("; ")
            )?;
        }
        if !self.idioms.is_empty() {
            write!(f, "\n\nIdiom (mengandung [{bare}])\n{}", self.idioms.join("; "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.word_classes.is_empty() {
            let codes: Vec<String> = self
                .word_classes
                .iter()
                .map(|class| format!("({})", class.code))
                .collect();
            parts.push(codes.join(" "));
        }
        parts.push(self.subsenses.join("; "));
        if !self.note.is_empty() {
            parts.push(self.note.clone());
        }

        let body = parts.join("  ");
        if self.examples.is_empty() {
            f.write_str(&body)
        } else {
            write!(f, "{body}: {}", self.examples.join("; "))
        }
    }
}

impl fmt::Display for Etymology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.origin_language.is_empty() {
            parts.push(format!("[{}]", self.origin_language));
        }
        if !self.word_classes.is_empty() {
            let classes: Vec<String> = self
                .word_classes
                .iter()
                .map(|class| format!("({class})"))
                .collect();
            parts.push(classes.join(" "));
        }
        let mut origin = self.origin_form.clone();
        if !self.pronunciation.is_empty() {
            origin.push(' ');
            origin.push_str(&self.pronunciation);
        }
        parts.push(origin);

        let body = parts.join(" ");
        if self.meanings.is_empty() {
            f.write_str(&body)
        } else {
            write!(f, "{body}: {}", self.meanings.join("; "))
        }
    }
}
