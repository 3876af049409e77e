//! Preference route handlers.
//!
//! The visitor's ambient color scheme arrives as the
//! `Sec-CH-Prefers-Color-Scheme` client hint; every preference response asks
//! the browser to keep sending it.

use axum::{
    Json,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse},
};
use diwan_core::{Language, Theme};
use tracing::instrument;

use crate::storage::session::SessionStorage;
use crate::stores::{PreferenceStore, Preferences};

/// Client hint carrying the visitor's system color scheme.
pub const COLOR_SCHEME_HINT: &str = "sec-ch-prefers-color-scheme";

/// Read the system theme from the color-scheme client hint.
///
/// Anything other than `dark` (including no hint) means light.
#[must_use]
pub fn system_theme(headers: &HeaderMap) -> Theme {
    let dark = headers
        .get(COLOR_SCHEME_HINT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_matches('"').eq_ignore_ascii_case("dark"));
    if dark { Theme::Dark } else { Theme::Light }
}

/// The visitor's active language.
pub fn active_language(storage: &mut SessionStorage, headers: &HeaderMap) -> Language {
    PreferenceStore::initialize(storage, system_theme(headers)).language()
}

fn with_hint_headers(preferences: Preferences) -> impl IntoResponse {
    (
        AppendHeaders([
            ("accept-ch", "Sec-CH-Prefers-Color-Scheme"),
            ("vary", "Sec-CH-Prefers-Color-Scheme"),
        ]),
        Json(preferences),
    )
}

/// Current preferences.
#[instrument(skip(storage, headers))]
pub async fn show(mut storage: SessionStorage, headers: HeaderMap) -> impl IntoResponse {
    let preferences = PreferenceStore::initialize(&mut storage, system_theme(&headers)).snapshot();
    with_hint_headers(preferences)
}

/// Flip between English and Arabic.
#[instrument(skip(storage, headers))]
pub async fn toggle_language(mut storage: SessionStorage, headers: HeaderMap) -> impl IntoResponse {
    let preferences = {
        let mut store = PreferenceStore::initialize(&mut storage, system_theme(&headers));
        store.toggle_language();
        store.snapshot()
    };
    storage.flush().await;
    with_hint_headers(preferences)
}

/// Flip between light and dark mode.
#[instrument(skip(storage, headers))]
pub async fn toggle_theme(mut storage: SessionStorage, headers: HeaderMap) -> impl IntoResponse {
    let preferences = {
        let mut store = PreferenceStore::initialize(&mut storage, system_theme(&headers));
        store.toggle_theme();
        store.snapshot()
    };
    storage.flush().await;
    with_hint_headers(preferences)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_system_theme_from_hint() {
        let mut headers = HeaderMap::new();
        assert_eq!(system_theme(&headers), Theme::Light);

        headers.insert(COLOR_SCHEME_HINT, HeaderValue::from_static("\"dark\""));
        assert_eq!(system_theme(&headers), Theme::Dark);

        headers.insert(COLOR_SCHEME_HINT, HeaderValue::from_static("light"));
        assert_eq!(system_theme(&headers), Theme::Light);
    }
}
