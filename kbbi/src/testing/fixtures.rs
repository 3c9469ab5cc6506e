//! Page builders mirroring the site's layout.

use crate::classify::NOT_FOUND_MARKER;
use crate::parser::SUGGESTION_MARKER;

/// Navigation bar served to anonymous visitors.
pub const LOGGED_OUT_NAV: &str =
    r#"<nav><ul><li><a id="loginLink" href="/Account/Login">Masuk</a></li></ul></nav>"#;

/// Navigation bar served to logged-in users.
pub const LOGGED_IN_NAV: &str =
    r#"<nav><ul><li><a href="/Account/Manage">Akun</a></li><li><a href="/Account/LogOff">Keluar</a></li></ul></nav>"#;

/// Wraps entry markup between the opening styled rule and the closing
/// unstyled rule of a result page.
#[must_use]
pub fn entry_page(entries: &str, logged_in: bool) -> String {
    let nav = if logged_in { LOGGED_IN_NAV } else { LOGGED_OUT_NAV };
    format!(
        r#"<!DOCTYPE html><html><head><title>KBBI Daring</title></head><body>{nav}<div class="container body-content"><h1>Hasil Pencarian</h1><hr style="margin: 0;">{entries}<hr><p>KBBI Daring</p></div></body></html>"#
    )
}

/// A not-found page listing `suggestions`.
#[must_use]
pub fn suggestion_page(suggestions: &[&str], logged_in: bool) -> String {
    let nav = if logged_in { LOGGED_IN_NAV } else { LOGGED_OUT_NAV };
    let items: String = suggestions
        .iter()
        .map(|s| format!(r#"<div class="col-md-3"><a href="/entri/{s}">{s}</a></div>"#))
        .collect();
    format!(
        r#"<!DOCTYPE html><html><head><title>KBBI Daring</title></head><body>{nav}<div class="container body-content"><h4 style="color:red">{NOT_FOUND_MARKER}</h4><p>{SUGGESTION_MARKER}</p><div class="row">{items}</div></div></body></html>"#
    )
}
