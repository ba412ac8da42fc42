//! Game settings and preferences
//!
//! The language choice and audio levels are the only things persisted;
//! gameplay progress is intentionally not saved between sessions.

use serde::{Deserialize, Serialize};

/// UI language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    En,
    /// The game shipped for a Czech-speaking kid first
    #[default]
    Cs,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Cs => "cs",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Language::En),
            "cs" => Some(Language::Cs),
            _ => None,
        }
    }

    /// The full localized string table for this language
    pub fn strings(&self) -> &'static Strings {
        match self {
            Language::En => &EN,
            Language::Cs => &CS,
        }
    }
}

/// Every user-visible string in the UI
#[derive(Debug)]
pub struct Strings {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub tracks2: &'static str,
    pub tracks3: &'static str,
    pub easier: &'static str,
    pub more_fun: &'static str,
    pub start: &'static str,
    pub level: &'static str,
    pub pause_title: &'static str,
    pub resume: &'static str,
    pub restart: &'static str,
    pub main_menu: &'static str,
    pub try_again: &'static str,
    pub level_complete: &'static str,
    pub next_level: &'static str,
}

static EN: Strings = Strings {
    title: "🚂 Wagon Dash!",
    subtitle: "How many tracks?",
    tracks2: "2 Tracks",
    tracks3: "3 Tracks",
    easier: "Easier",
    more_fun: "More fun!",
    start: "▶ Start!",
    level: "Level",
    pause_title: "⏸️ Paused",
    resume: "▶ Resume",
    restart: "🔄 Restart",
    main_menu: "🏠 Main Menu",
    try_again: "Let's try another way! 🚂",
    level_complete: "🎉 Level Complete! 🎉",
    next_level: "Get ready for Level",
};

static CS: Strings = Strings {
    title: "🚂 Chyť zlobivé vagóny!",
    subtitle: "Kolik kolejí?",
    tracks2: "2 koleje",
    tracks3: "3 koleje",
    easier: "Jednodušší",
    more_fun: "Větší zábava!",
    start: "▶ Start!",
    level: "Level",
    pause_title: "⏸️ Pauza",
    resume: "▶ Pokračovat",
    restart: "🔄 Znovu",
    main_menu: "🏠 Hlavní menu",
    try_again: "Zkusíme jinou cestu! 🚂",
    level_complete: "🎉 Level dokončen! 🎉",
    next_level: "Připrav se na Level",
};

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub language: Language,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            master_volume: 0.8,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "wagon_dash_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(settings) = serde_json::from_str(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
