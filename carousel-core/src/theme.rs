//! Document-wide theme: palette, typography and spacing.

use serde::{Deserialize, Serialize};

/// Colour roles used by the slide renderer.
///
/// Values are CSS colour strings (`#rrggbb`, `rgba(...)`); the core stores
/// them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct ThemeColors {
    pub background: String,
    pub background_subtle: String,
    pub text: String,
    pub text_secondary: String,
    pub text_muted: String,
    pub highlight: String,
    pub accent: String,
    pub divider: String,
    pub card_background: String,
    pub highlight_soft: String,
    pub highlight_border: String,
    pub icon_color: String,
    pub icon_color_alt: String,
}

/// Font family and weight for one typography category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypographyStyle {
    /// Font family name.
    pub family: String,
    /// CSS font weight (100-900).
    pub weight: u16,
}

impl TypographyStyle {
    fn archivo(weight: u16) -> Self {
        Self {
            family: "Archivo".to_string(),
            weight,
        }
    }
}

/// Typography per text category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct ThemeTypography {
    pub heading: TypographyStyle,
    pub paragraph: TypographyStyle,
    pub subtitle: TypographyStyle,
    pub tag: TypographyStyle,
    pub quote: TypographyStyle,
    pub stat: TypographyStyle,
}

impl Default for ThemeTypography {
    fn default() -> Self {
        Self {
            heading: TypographyStyle::archivo(700),
            paragraph: TypographyStyle::archivo(400),
            subtitle: TypographyStyle::archivo(500),
            tag: TypographyStyle::archivo(700),
            quote: TypographyStyle::archivo(500),
            stat: TypographyStyle::archivo(900),
        }
    }
}

/// A complete theme. One per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Display name.
    pub name: String,
    /// Colour palette.
    pub colors: ThemeColors,
    /// Typography map.
    pub typography: ThemeTypography,
    /// Multiplier applied to every font size.
    pub font_scale: f64,
    /// Vertical gap between flow elements, in logical units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_gap: Option<f64>,
}

impl Theme {
    /// The built-in dark theme (the default for new documents).
    #[must_use]
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            colors: ThemeColors {
                background: "#0a0e1a".into(),
                background_subtle: "#111827".into(),
                text: "#f8fafc".into(),
                text_secondary: "#cbd5e1".into(),
                text_muted: "#64748b".into(),
                highlight: "#fbbf24".into(),
                accent: "#f59e0b".into(),
                divider: "#1e293b".into(),
                card_background: "#0f172a".into(),
                highlight_soft: "rgba(251,191,36,0.10)".into(),
                highlight_border: "rgba(251,191,36,0.25)".into(),
                icon_color: "#fbbf24".into(),
                icon_color_alt: "#f59e0b".into(),
            },
            typography: ThemeTypography::default(),
            font_scale: 1.0,
            element_gap: None,
        }
    }

    /// The built-in light theme.
    #[must_use]
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            colors: ThemeColors {
                background: "#ffffff".into(),
                background_subtle: "#f8fafc".into(),
                text: "#0f172a".into(),
                text_secondary: "#475569".into(),
                text_muted: "#94a3b8".into(),
                highlight: "#f59e0b".into(),
                accent: "#d97706".into(),
                divider: "#e2e8f0".into(),
                card_background: "#ffffff".into(),
                highlight_soft: "rgba(245,158,11,0.08)".into(),
                highlight_border: "rgba(245,158,11,0.20)".into(),
                icon_color: "#f59e0b".into(),
                icon_color_alt: "#d97706".into(),
            },
            typography: ThemeTypography::default(),
            font_scale: 1.0,
            element_gap: None,
        }
    }

    /// Builder-style font scale override.
    #[must_use]
    pub fn with_font_scale(mut self, font_scale: f64) -> Self {
        self.font_scale = font_scale;
        self
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_json_uses_camel_case() {
        let json = serde_json::to_value(Theme::dark()).expect("serialize");
        assert_eq!(json["colors"]["backgroundSubtle"], "#111827");
        assert_eq!(json["colors"]["iconColorAlt"], "#f59e0b");
        assert_eq!(json["fontScale"], 1.0);
        assert!(json.get("elementGap").is_none());
    }

    #[test]
    fn test_light_and_dark_differ() {
        assert_ne!(Theme::light(), Theme::dark());
        assert_eq!(Theme::default(), Theme::dark());
    }
}
