use crate::storage::{Storage, StorageResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const SETTINGS_FILE: &str = "settings.json";

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 16;

/// Selectable colour themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeName {
    #[default]
    Dark,
    Light,
    HighContrast,
}

impl ThemeName {
    pub fn next(self) -> Self {
        match self {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::HighContrast,
            ThemeName::HighContrast => ThemeName::Dark,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeName::Dark => "Dark",
            ThemeName::Light => "Light",
            ThemeName::HighContrast => "High contrast",
        }
    }
}

/// Persisted player preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeName,
    /// Ring the terminal bell on solve and on hints
    pub sound: bool,
    /// Remind about an unsolved daily challenge on the main menu
    pub notifications: bool,
    pub player_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            sound: true,
            notifications: true,
            player_name: "Detective".to_string(),
        }
    }
}

impl Settings {
    pub fn load(storage: &Storage) -> Self {
        let mut settings: Self = storage.load(SETTINGS_FILE);
        let name = settings.player_name.clone();
        settings.set_player_name(&name);
        settings
    }

    pub fn save(&self, storage: &Storage) -> StorageResult<()> {
        storage.save(SETTINGS_FILE, self)
    }

    /// Trim and cap a name; blank names keep the current one
    pub fn set_player_name(&mut self, name: &str) {
        let name: String = name.trim().chars().take(MAX_NAME_LEN).collect();
        if name.is_empty() {
            if self.player_name.trim().is_empty() {
                self.player_name = Settings::default().player_name;
            }
        } else {
            self.player_name = name;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle() {
        assert_eq!(ThemeName::Dark.next(), ThemeName::Light);
        assert_eq!(ThemeName::HighContrast.next(), ThemeName::Dark);
    }

    #[test]
    fn test_player_name_rules() {
        let mut settings = Settings::default();
        settings.set_player_name("   ");
        assert_eq!(settings.player_name, "Detective");
        settings.set_player_name("  Marple  ");
        assert_eq!(settings.player_name, "Marple");
        settings.set_player_name("Hercule Poirot The Great");
        assert_eq!(settings.player_name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_persist_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::at(dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.theme = ThemeName::HighContrast;
        settings.sound = false;
        settings.set_player_name("Holmes");
        settings.save(&storage).unwrap();

        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{ "theme": "light" }"#).unwrap();
        let settings = Settings::load(&Storage::at(dir.path().to_path_buf()));
        assert_eq!(settings.theme, ThemeName::Light);
        assert!(settings.sound);
        assert_eq!(settings.player_name, "Detective");
    }
}
