//! Language and theme preferences.

use diwan_core::{Language, TextDirection, Theme};
use serde::Serialize;

use crate::storage::{KeyValueStorage, keys, load_parsed, save_plain};

/// Snapshot of the visitor's preferences, as rendered by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub language: Language,
    pub theme: Theme,
    /// `rtl` when the language is Arabic.
    pub direction: TextDirection,
    /// Whether the dark color-mode flag should be set on the document.
    pub dark: bool,
}

/// Holds and persists the language and theme selection.
pub struct PreferenceStore<S> {
    storage: S,
    language: Language,
    theme: Theme,
}

impl<S: KeyValueStorage> PreferenceStore<S> {
    /// Restore preferences from storage.
    ///
    /// A missing or unrecognized theme falls back to `system_theme` (the
    /// visitor's ambient color-scheme signal); a missing language falls back
    /// to English. Fallbacks are not written back.
    pub fn initialize(storage: S, system_theme: Theme) -> Self {
        let theme = load_parsed(&storage, keys::THEME).unwrap_or(system_theme);
        let language = load_parsed(&storage, keys::LANGUAGE).unwrap_or_default();

        Self {
            storage,
            language,
            theme,
        }
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Current text direction.
    #[must_use]
    pub const fn direction(&self) -> TextDirection {
        self.language.direction()
    }

    /// Whether the dark color-mode flag should be applied.
    #[must_use]
    pub const fn is_dark(&self) -> bool {
        matches!(self.theme, Theme::Dark)
    }

    #[must_use]
    pub const fn snapshot(&self) -> Preferences {
        Preferences {
            language: self.language,
            theme: self.theme,
            direction: self.language.direction(),
            dark: self.is_dark(),
        }
    }

    /// Switch between English and Arabic and persist the choice.
    pub fn toggle_language(&mut self) {
        self.language = self.language.toggled();
        save_plain(&mut self.storage, keys::LANGUAGE, &self.language);
        tracing::debug!(language = %self.language, "Language toggled");
    }

    /// Switch between light and dark mode and persist the choice.
    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        save_plain(&mut self.storage, keys::THEME, &self.theme);
        tracing::debug!(theme = %self.theme, "Theme toggled");
    }

    /// Release the underlying storage.
    pub fn into_storage(self) -> S {
        self.storage
    }
}
