//! Rendering settings carried inside the record.
//!
//! Numeric values are clamped to the same ranges the settings editor offers.

use serde::{Deserialize, Serialize};

use crate::core::record::RecordError;

pub const BASE_FONT_SIZE_RANGE: (f64, f64) = (8.0, 16.0);
pub const HEADING_SIZE_RANGE: (f64, f64) = (12.0, 26.0);
pub const LINE_HEIGHT_RANGE: (f64, f64) = (1.0, 2.5);
pub const SECTION_SPACING_RANGE: (f64, f64) = (0.0, 6.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnglishFont {
    Arial,
    #[default]
    Inter,
    Serif,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArabicFont {
    #[default]
    Cairo,
    Tajawal,
    Sans,
    Serif,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl EnglishFont {
    /// CSS font stack for the HTML preview.
    pub fn css_family(self) -> &'static str {
        match self {
            EnglishFont::Arial => "Arial, Helvetica, sans-serif",
            EnglishFont::Inter => "Inter, system-ui, sans-serif",
            EnglishFont::Serif => "'Times New Roman', Times, serif",
        }
    }
}

impl ArabicFont {
    pub fn css_family(self) -> &'static str {
        match self {
            ArabicFont::Cairo => "Cairo, sans-serif",
            ArabicFont::Tajawal => "Tajawal, sans-serif",
            ArabicFont::Sans => "Arial, sans-serif",
            ArabicFont::Serif => "'Times New Roman', serif",
        }
    }
}

impl FontSize {
    /// Point size used by the English template.
    pub fn points(self) -> f64 {
        match self {
            FontSize::Small => 10.0,
            FontSize::Medium => 11.0,
            FontSize::Large => 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSettings {
    pub english_font: EnglishFont,
    pub arabic_font: ArabicFont,
    pub accent_color: String,
    pub font_size: FontSize,
    pub base_font_size: f64,
    pub line_height: f64,
    pub section_spacing: f64,
    pub heading_size: f64,
}

impl Default for CvSettings {
    fn default() -> Self {
        Self {
            english_font: EnglishFont::Inter,
            arabic_font: ArabicFont::Cairo,
            accent_color: String::from("#4f46e5"),
            font_size: FontSize::Medium,
            base_font_size: 11.0,
            line_height: 1.6,
            section_spacing: 2.5,
            heading_size: 14.0,
        }
    }
}

fn clamp(value: f64, (lo, hi): (f64, f64), fallback: f64) -> f64 {
    if value.is_finite() { value.clamp(lo, hi) } else { fallback }
}

/// Parses `#rgb` or `#rrggbb` into its components.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

impl CvSettings {
    /// Returns a copy with every numeric setting inside its range and a
    /// usable accent color.
    pub fn clamped(self) -> Self {
        let defaults = CvSettings::default();
        let accent_color = if parse_hex_color(&self.accent_color).is_some() {
            self.accent_color
        } else {
            defaults.accent_color
        };
        Self {
            accent_color,
            base_font_size: clamp(self.base_font_size, BASE_FONT_SIZE_RANGE, defaults.base_font_size),
            line_height: clamp(self.line_height, LINE_HEIGHT_RANGE, defaults.line_height),
            section_spacing: clamp(self.section_spacing, SECTION_SPACING_RANGE, defaults.section_spacing),
            heading_size: clamp(self.heading_size, HEADING_SIZE_RANGE, defaults.heading_size),
            ..self
        }
    }

    /// Accent color as RGB, falling back to the default indigo.
    pub fn accent_rgb(&self) -> (u8, u8, u8) {
        parse_hex_color(&self.accent_color).unwrap_or((0x4f, 0x46, 0xe5))
    }

    /// Applies one `key value` pair as typed in the settings editor.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), RecordError> {
        let invalid = || RecordError::InvalidSetting(format!("{key} = {value}"));
        let number = || value.trim().parse::<f64>().map_err(|_| invalid());
        let keyword = || serde_json::Value::String(value.trim().to_ascii_lowercase());

        match key {
            "englishFont" => {
                self.english_font = serde_json::from_value(keyword()).map_err(|_| invalid())?
            }
            "arabicFont" => {
                self.arabic_font = serde_json::from_value(keyword()).map_err(|_| invalid())?
            }
            "fontSize" => {
                self.font_size = serde_json::from_value(keyword()).map_err(|_| invalid())?
            }
            "accentColor" => {
                parse_hex_color(value).ok_or_else(invalid)?;
                self.accent_color = value.trim().to_string();
            }
            "baseFontSize" => self.base_font_size = number()?,
            "lineHeight" => self.line_height = number()?,
            "sectionSpacing" => self.section_spacing = number()?,
            "headingSize" => self.heading_size = number()?,
            _ => return Err(RecordError::InvalidSetting(format!("unknown key '{key}'"))),
        }
        *self = self.clone().clamped();
        Ok(())
    }
}
