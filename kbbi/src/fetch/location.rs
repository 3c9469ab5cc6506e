//! Request paths for a search term.

/// Terms the entry route cannot serve; they go through the search form.
const RESERVED_TERMS: &[&str] = &["nul", "bin"];

/// Returns the site-relative path used to look up `term`.
///
/// Ordinary terms (spaces included) use the direct entry route. Terms with
/// `.` or `?`, and the reserved names, use the search-results route.
#[must_use]
pub fn resolve_path(term: &str) -> String {
    if needs_search_route(term) {
        format!("Cari/Hasil?frasa={}", query_escape(term))
    } else {
        format!("entri/{}", urlencoding::encode(term))
    }
}

/// Full URL for `term` under `host`.
#[must_use]
pub fn resolve_url(host: &str, term: &str) -> String {
    format!("{}/{}", host.trim_end_matches('/'), resolve_path(term))
}

fn needs_search_route(term: &str) -> bool {
    if term.contains('.') || term.contains('?') {
        return true;
    }
    let lowered = term.to_lowercase();
    RESERVED_TERMS.contains(&lowered.as_str())
}

/// Form-style escaping: spaces become `+`.
fn query_escape(term: &str) -> String {
    urlencoding::encode(term).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_term() {
        assert_eq!(resolve_path("rumah"), "entri/rumah");
    }

    #[test]
    fn test_term_with_space_uses_entry_route() {
        assert_eq!(resolve_path("rumah sakit"), "entri/rumah%20sakit");
    }

    #[test]
    fn test_unicode_term_is_escaped() {
        assert_eq!(resolve_path("é"), "entri/%C3%A9");
    }

    #[test]
    fn test_dot_and_question_mark_use_search_route() {
        assert_eq!(resolve_path("a.n."), "Cari/Hasil?frasa=a.n.");
        assert_eq!(resolve_path("apa?"), "Cari/Hasil?frasa=apa%3F");
        assert_eq!(resolve_path("dll. lain"), "Cari/Hasil?frasa=dll.+lain");
    }

    #[test]
    fn test_reserved_terms_case_insensitive() {
        assert_eq!(resolve_path("nul"), "Cari/Hasil?frasa=nul");
        assert_eq!(resolve_path("BIN"), "Cari/Hasil?frasa=BIN");
        assert_eq!(resolve_path("bina"), "entri/bina");
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://kbbi.kemdikbud.go.id/", "rumah"),
            "https://kbbi.kemdikbud.go.id/entri/rumah"
        );
    }
}
