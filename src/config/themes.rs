use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ThemeName {
    #[default]
    Rose,
    Midnight,
    Parchment,
}

impl ThemeName {
    /// Parses a configured name; unknown names fall back to `Rose`.
    pub fn from_name(raw: &str) -> Self {
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(theme = raw, "unknown theme in config, falling back to rose");
            ThemeName::Rose
        })
    }

    pub fn palette(self) -> Palette {
        match self {
            ThemeName::Rose => Palette {
                accent: Color::Rgb(240, 67, 67),
                text: Color::Rgb(253, 245, 230),
                muted: Color::Gray,
                card: Color::Rgb(232, 228, 220),
                highlight: Color::Yellow,
                error: Color::LightRed,
            },
            ThemeName::Midnight => Palette {
                accent: Color::Magenta,
                text: Color::White,
                muted: Color::DarkGray,
                card: Color::Blue,
                highlight: Color::Cyan,
                error: Color::Red,
            },
            ThemeName::Parchment => Palette {
                accent: Color::Rgb(139, 69, 19),
                text: Color::Rgb(60, 40, 20),
                muted: Color::Rgb(150, 130, 100),
                card: Color::Rgb(240, 230, 200),
                highlight: Color::Rgb(200, 60, 60),
                error: Color::Red,
            },
        }
    }
}

impl<'de> Deserialize<'de> for ThemeName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ThemeName::from_name(&raw))
    }
}

/// Colors the UI draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: Color,
    pub text: Color,
    pub muted: Color,
    pub card: Color,
    pub highlight: Color,
    pub error: Color,
}
