//! Classification of fetched pages into domain errors.

use crate::errors::ErrorKind;

/// Redirect targets that identify an error page, checked in order.
const URL_MARKERS: &[(&str, ErrorKind)] = &[
    ("Beranda/Error", ErrorKind::GenericFailure),
    ("Beranda/BatasSehari", ErrorKind::DailyLimitExceeded),
    ("Beranda/ModaTerbatas", ErrorKind::RestrictedMode),
    ("Account/Banned", ErrorKind::AccountSuspended),
];

/// Phrase shown on a page for a term without an entry.
pub const NOT_FOUND_MARKER: &str = "Entri tidak ditemukan.";

const RESTRICTED_MODE_MARKERS: &[&str] = &[
    "Moda terbatas sedang diaktifkan",
    "pengguna tidak terdaftar tidak dapat dilayani",
    "moda terbatas",
];

/// Present on every page served to a visitor who is not logged in.
const LOGIN_LINK_MARKER: &str = "loginLink";

/// Maps a response to a domain error; the first matching rule wins.
///
/// Redirect targets take precedence over page content.
#[must_use]
pub fn classify(final_url: &str, html: &str) -> Option<ErrorKind> {
    if let Some(&(_, kind)) = URL_MARKERS
        .iter()
        .find(|(marker, _)| final_url.contains(marker))
    {
        return Some(kind);
    }

    if html.contains(NOT_FOUND_MARKER) {
        return Some(ErrorKind::NotFound);
    }

    if RESTRICTED_MODE_MARKERS
        .iter()
        .any(|marker| html.contains(marker))
    {
        return Some(ErrorKind::RestrictedMode);
    }

    None
}

/// Whether the page was rendered for a logged-in user.
#[must_use]
pub fn is_logged_in(html: &str) -> bool {
    !html.contains(LOGIN_LINK_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY_URL: &str = "https://kbbi.kemdikbud.go.id/entri/rumah";

    #[test]
    fn test_url_markers() {
        let cases = [
            ("https://kbbi.kemdikbud.go.id/Beranda/Error", ErrorKind::GenericFailure),
            ("https://kbbi.kemdikbud.go.id/Beranda/BatasSehari", ErrorKind::DailyLimitExceeded),
            ("https://kbbi.kemdikbud.go.id/Beranda/ModaTerbatas", ErrorKind::RestrictedMode),
            ("https://kbbi.kemdikbud.go.id/Account/Banned", ErrorKind::AccountSuspended),
        ];
        for (url, expected) in cases {
            assert_eq!(classify(url, "<html></html>"), Some(expected), "{url}");
        }
    }

    #[test]
    fn test_url_takes_precedence_over_content() {
        let html = "<p>Entri tidak ditemukan.</p>";
        assert_eq!(
            classify("https://kbbi.kemdikbud.go.id/Beranda/Error", html),
            Some(ErrorKind::GenericFailure)
        );
    }

    #[test]
    fn test_not_found_content() {
        let html = "<h4>Entri tidak ditemukan.</h4><p>Berikut beberapa saran entri lain yang mirip.</p>";
        assert_eq!(classify(ENTRY_URL, html), Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_not_found_before_restricted_content() {
        let html = "Entri tidak ditemukan. moda terbatas";
        assert_eq!(classify(ENTRY_URL, html), Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_restricted_mode_content() {
        for html in [
            "Moda terbatas sedang diaktifkan",
            "maaf, pengguna tidak terdaftar tidak dapat dilayani",
            "situs dalam moda terbatas",
        ] {
            assert_eq!(classify(ENTRY_URL, html), Some(ErrorKind::RestrictedMode), "{html}");
        }
    }

    #[test]
    fn test_ordinary_page() {
        assert_eq!(classify(ENTRY_URL, "<h2>ru.mah</h2>"), None);
    }

    #[test]
    fn test_is_logged_in() {
        assert!(!is_logged_in(r#"<a id="loginLink" href="/Account/Login">Masuk</a>"#));
        assert!(is_logged_in(r#"<a href="/Account/Logout">Keluar</a>"#));
    }
}
