//! Colour palettes and music per scenario mood

use glam::Vec4;

use crate::audio::MusicMode;
use crate::scenario::Sentiment;

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn from_hex(hex: u32) -> Self {
        Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    /// Normalised RGBA for GPU-style consumers
    pub fn to_vec4(self, alpha: f32) -> Vec4 {
        Vec4::new(
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            alpha,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgb,
    pub foreground: Rgb,
    pub panel: Rgb,
    /// Targets and highlights
    pub accent: Rgb,
    /// Safe areas (connector path, sorter bins)
    pub safe: Rgb,
    /// Music for the menu mood; gameplay may override it
    pub music: MusicMode,
}

impl Theme {
    pub const NEGATIVE: Theme = Theme {
        name: "negative",
        background: Rgb::from_hex(0x0f172a),
        foreground: Rgb::from_hex(0xcbd5e1),
        panel: Rgb::from_hex(0x1e293b),
        accent: Rgb::from_hex(0xef4444),
        safe: Rgb::from_hex(0x3b82f6),
        music: MusicMode::Drone,
    };

    pub const POSITIVE: Theme = Theme {
        name: "positive",
        background: Rgb::from_hex(0xfffbeb),
        foreground: Rgb::from_hex(0x44403c),
        panel: Rgb::from_hex(0xffffff),
        accent: Rgb::from_hex(0xf59e0b),
        safe: Rgb::from_hex(0x10b981),
        music: MusicMode::Arpeggio,
    };

    pub const NEUTRAL: Theme = Theme {
        name: "neutral",
        background: Rgb::from_hex(0x262626),
        foreground: Rgb::from_hex(0xeeeeee),
        panel: Rgb::from_hex(0x333333),
        accent: Rgb::from_hex(0x00d2ff),
        safe: Rgb::from_hex(0x00d2ff),
        music: MusicMode::Silence,
    };

    pub fn for_sentiment(sentiment: Sentiment) -> Theme {
        match sentiment {
            Sentiment::Negative => Theme::NEGATIVE,
            Sentiment::Positive => Theme::POSITIVE,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        assert_eq!(Theme::NEGATIVE.accent.to_hex(), "#ef4444");
        assert_eq!(Theme::POSITIVE.background.to_hex(), "#fffbeb");
        assert_eq!(Rgb::from_hex(0x00d2ff), Rgb(0, 210, 255));
    }

    #[test]
    fn test_vec4() {
        let c = Rgb(255, 0, 51).to_vec4(0.5);
        assert_eq!(c, Vec4::new(1.0, 0.0, 0.2, 0.5));
    }

    #[test]
    fn test_sentiment_mapping() {
        assert_eq!(Theme::for_sentiment(Sentiment::Negative).music, MusicMode::Drone);
        assert_eq!(Theme::for_sentiment(Sentiment::Positive).name, "positive");
        assert_eq!(Theme::default().music, MusicMode::Silence);
    }
}
