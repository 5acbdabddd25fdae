//! Theme
//!
//! Light, dark or follow the system. Applied as a class on `<html>` and
//! remembered in localStorage.

use leptos::prelude::*;

const THEME_KEY: &str = "app-theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Light, Theme::Dark, Theme::System];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Light => "Claro",
            Theme::Dark => "Escuro",
            Theme::System => "Sistema",
        }
    }

    /// Class put on `<html>`, resolving `System` with the media query
    fn resolved_class(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System if system_prefers_dark() => "dark",
            Theme::System => "light",
        }
    }
}

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

/// Saved theme, `System` when none
pub fn load_theme() -> Theme {
    storage()
        .and_then(|s| s.get_item(THEME_KEY).ok().flatten())
        .and_then(|v| Theme::parse(&v))
        .unwrap_or_default()
}

pub fn save_theme(theme: Theme) {
    if let Some(s) = storage() {
        let _ = s.set_item(THEME_KEY, theme.as_str());
    }
}

/// Swap the light/dark class on the document element
pub fn apply_theme(theme: Theme) {
    let Some(root) = web_sys::window().and_then(|w| w.document()).and_then(|d| d.document_element()) else {
        return;
    };
    let classes = root.class_list();
    let _ = classes.remove_2("light", "dark");
    let _ = classes.add_1(theme.resolved_class());
}

/// Theme signal that applies and persists every change
pub fn create_theme_signal() -> (ReadSignal<Theme>, WriteSignal<Theme>) {
    let (theme, set_theme) = signal(load_theme());
    Effect::new(move |_| {
        let current = theme.get();
        apply_theme(current);
        save_theme(current);
    });
    (theme, set_theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_themes() {
        for theme in Theme::ALL {
            assert_eq!(Theme::parse(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::parse("sepia"), None);
    }

    #[test]
    fn test_default_follows_system() {
        assert_eq!(Theme::default(), Theme::System);
    }
}
