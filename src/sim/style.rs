//! Edge style registry keyed by cell type id
//!
//! Immutable once built. Extending returns a new registry so independent
//! simulations never observe each other's styles.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Fallback type id, always present
pub const DEFAULT_STYLE_ID: &str = "default";

/// 8-bit RGB triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or one of the named colors used by the
    /// built-in styles
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        if let Some(hex) = color.strip_prefix('#') {
            if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return None;
            }
            let value = u32::from_str_radix(hex, 16).ok()?;
            return match hex.len() {
                3 => {
                    let nibble = |shift: u32| ((value >> shift) & 0xF) as u8 * 0x11;
                    Some(Self::new(nibble(8), nibble(4), nibble(0)))
                }
                6 => Some(Self::new(
                    (value >> 16) as u8,
                    (value >> 8) as u8,
                    value as u8,
                )),
                _ => None,
            };
        }
        let named = match color.to_ascii_lowercase().as_str() {
            "black" => Self::new(0, 0, 0),
            "white" => Self::new(255, 255, 255),
            "red" => Self::RED,
            "orange" => Self::new(255, 165, 0),
            "yellow" => Self::new(255, 255, 0),
            "green" => Self::new(0, 128, 0),
            "blue" => Self::new(0, 0, 255),
            "purple" => Self::new(128, 0, 128),
            _ => return None,
        };
        Some(named)
    }
}

/// Visual and audio description of a cell type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexStyle {
    pub name: String,
    /// Stroke color per edge index
    pub edge_colors: [String; 6],
    /// MIDI note per edge index
    pub edge_notes: [u8; 6],
    #[serde(default)]
    pub fill_color: Option<String>,
}

impl HexStyle {
    fn from_parts(name: &str, colors: [&str; 6], notes: [u8; 6], fill: &str) -> Self {
        Self {
            name: name.to_string(),
            edge_colors: colors.map(str::to_string),
            edge_notes: notes,
            fill_color: Some(fill.to_string()),
        }
    }

    /// Parsed stroke color of edge `edge`, if the string is understood
    pub fn edge_rgb(&self, edge: usize) -> Option<Rgb> {
        Rgb::parse(&self.edge_colors[edge % 6])
    }

    pub fn default_style() -> Self {
        Self::from_parts(
            "Default",
            ["red", "orange", "yellow", "green", "blue", "purple"],
            [36, 38, 36, 38, 36, 38],
            "#222",
        )
    }

    pub fn fire() -> Self {
        Self::from_parts(
            "Fire",
            ["#ff4500", "#ff6347", "#ff7f50", "#ffa07a", "#ff8c00", "#ffdab9"],
            [36, 37, 37, 37, 37, 37],
            "#330000",
        )
    }
}

/// Style table consulted by id
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    styles: Arc<BTreeMap<String, HexStyle>>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        let mut styles = BTreeMap::new();
        styles.insert(DEFAULT_STYLE_ID.to_string(), HexStyle::default_style());
        styles.insert("fire".to_string(), HexStyle::fire());
        Self {
            styles: Arc::new(styles),
        }
    }
}

impl StyleRegistry {
    /// Registry with the built-in styles
    pub fn new() -> Self {
        Self::default()
    }

    /// New registry with `style` registered under `id` (replacing any previous entry).
    /// Registering `"default"` replaces the fallback.
    pub fn with_style(&self, id: impl Into<String>, style: HexStyle) -> Self {
        let mut styles = (*self.styles).clone();
        styles.insert(id.into(), style);
        Self {
            styles: Arc::new(styles),
        }
    }

    /// Style for `id`, falling back to `"default"`
    pub fn get(&self, id: &str) -> &HexStyle {
        match self.styles.get(id) {
            Some(style) => style,
            None => self.fallback(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }

    fn fallback(&self) -> &HexStyle {
        // The default entry is inserted at construction and never removed
        static BUILTIN: std::sync::OnceLock<HexStyle> = std::sync::OnceLock::new();
        self.styles
            .get(DEFAULT_STYLE_ID)
            .unwrap_or_else(|| BUILTIN.get_or_init(HexStyle::default_style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_falls_back_to_default() {
        let registry = StyleRegistry::new();
        assert_eq!(registry.get("water").name, "Default");
        assert_eq!(registry.get("fire").name, "Fire");
    }

    #[test]
    fn test_with_style_leaves_original_untouched() {
        let base = StyleRegistry::new();
        let mut ice = HexStyle::default_style();
        ice.name = "Ice".to_string();
        let extended = base.with_style("ice", ice);

        assert_eq!(extended.get("ice").name, "Ice");
        assert!(!base.contains("ice"));
        assert_eq!(base.get("ice").name, "Default");
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgb::parse("#ff4500"), Some(Rgb::new(255, 69, 0)));
        assert_eq!(Rgb::parse("#222"), Some(Rgb::new(0x22, 0x22, 0x22)));
        assert_eq!(Rgb::parse("Purple"), Some(Rgb::new(128, 0, 128)));
        assert_eq!(Rgb::parse("#12345"), None);
        assert_eq!(Rgb::parse("#zzzzzz"), None);
        assert_eq!(Rgb::parse("chartreuse"), None);
    }

    #[test]
    fn test_builtin_edge_colors_parse() {
        for style in [HexStyle::default_style(), HexStyle::fire()] {
            for edge in 0..6 {
                assert!(style.edge_rgb(edge).is_some(), "{} edge {edge}", style.name);
            }
        }
        assert_eq!(HexStyle::default_style().edge_rgb(1), Some(Rgb::new(255, 165, 0)));
    }

    #[test]
    fn test_style_from_json() {
        let json = r##"{
            "name": "Mono",
            "edge_colors": ["#fff", "#fff", "#fff", "#fff", "#fff", "#fff"],
            "edge_notes": [60, 62, 64, 65, 67, 69]
        }"##;
        let style: HexStyle = serde_json::from_str(json).unwrap();
        assert_eq!(style.edge_notes[2], 64);
        assert!(style.fill_color.is_none());
    }
}
