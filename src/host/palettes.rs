//! Palette registry for series colors
//!
//! Loads palettes from palettes.json (embedded at compile time) and provides access by
//! name. "Default" is the host's default categorical palette; the extension picks
//! series colors from it by slot index.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded palettes.json content
const PALETTES_JSON: &str = include_str!("../../palettes.json");

/// Name of the palette series colors are drawn from
pub const DEFAULT_PALETTE: &str = "Default";

/// Gray used when a palette is empty or a color fails to parse
const FALLBACK_RGB: [u8; 3] = [128, 128, 128];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteType {
    Categorical,
    Sequential,
    Diverging,
}

/// A single palette definition from palettes.json
#[derive(Debug, Clone, Deserialize)]
pub struct PaletteDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub palette_type: PaletteType,
    pub colors: Vec<String>,
}

impl PaletteDefinition {
    /// Get a color by slot (wraps around)
    pub fn get_color(&self, index: usize) -> [u8; 3] {
        if self.colors.is_empty() {
            return FALLBACK_RGB;
        }
        let idx = index % self.colors.len();
        parse_hex_color(&self.colors[idx]).unwrap_or(FALLBACK_RGB)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PaletteRegistry {
    /// Palettes by lowercase name
    palettes: HashMap<String, PaletteDefinition>,
}

impl PaletteRegistry {
    pub fn from_json(json: &str) -> Result<Self, String> {
        let definitions: Vec<PaletteDefinition> = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse palettes JSON: {}", e))?;

        let palettes: HashMap<String, PaletteDefinition> = definitions
            .into_iter()
            .map(|def| (def.name.to_lowercase(), def))
            .collect();

        log::debug!("PaletteRegistry: loaded {} palettes", palettes.len());
        Ok(Self { palettes })
    }

    /// Get a palette by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&PaletteDefinition> {
        self.palettes.get(&name.to_lowercase())
    }

    pub fn default_palette(&self) -> Option<&PaletteDefinition> {
        self.get(DEFAULT_PALETTE)
    }
}

static PALETTE_REGISTRY: OnceLock<PaletteRegistry> = OnceLock::new();

/// Global palette registry, initialized on first access
pub fn palette_registry() -> &'static PaletteRegistry {
    PALETTE_REGISTRY.get_or_init(|| {
        PaletteRegistry::from_json(PALETTES_JSON).unwrap_or_else(|e| {
            log::error!("Failed to load palettes.json: {}", e);
            PaletteRegistry::default()
        })
    })
}

/// Color from the default palette by slot, gray if the palette is missing
pub fn default_color(slot: usize) -> [u8; 3] {
    palette_registry()
        .default_palette()
        .map(|p| p.get_color(slot))
        .unwrap_or(FALLBACK_RGB)
}

/// Format an RGB triple as a CSS `rgba()` string
pub fn rgba(color: [u8; 3], alpha: f64) -> String {
    format!("rgba({},{},{},{})", color[0], color[1], color[2], alpha)
}

/// Parse `#RRGGBB` / `#RRGGBBAA` (with or without `#`), alpha ignored
fn parse_hex_color(hex: &str) -> Option<[u8; 3]> {
    let hex = hex.trim_start_matches('#');

    if hex.len() != 6 && hex.len() != 8 {
        log::warn!("Invalid hex color length '{}': {}", hex, hex.len());
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some([r, g, b])
}
