use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::{Catalog, DEFAULT_BUDGET, Preset, Size};

/// A field that is either a catalog entry or the visitor's own words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Choice {
    Catalog {
        id: String,
    },
    Custom {
        #[serde(default)]
        text: String,
    },
}

impl Choice {
    pub fn catalog(id: impl Into<String>) -> Self {
        Self::Catalog { id: id.into() }
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self::Custom { text: text.into() }
    }
}

/// Palette selection. A custom palette may also pin explicit swatches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaletteChoice {
    Catalog {
        id: String,
    },
    Custom {
        #[serde(default)]
        text: String,
        #[serde(default)]
        colors: Vec<String>,
    },
}

impl PaletteChoice {
    pub fn catalog(id: impl Into<String>) -> Self {
        Self::Catalog { id: id.into() }
    }

    pub fn custom(text: impl Into<String>, colors: Vec<String>) -> Self {
        Self::Custom {
            text: text.into(),
            colors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BouquetConfig {
    /// Flower IDs in the order they were picked. Duplicates are kept.
    pub flowers: Vec<String>,
    pub custom_flowers: String,
    pub color_palette: PaletteChoice,
    pub arrangement_style: Choice,
    pub size: Size,
    pub shape: Choice,
    pub negative_prompt: String,
    pub extras: String,
}

impl Default for BouquetConfig {
    fn default() -> Self {
        Self::with_catalog_defaults(Catalog::standard())
    }
}

impl BouquetConfig {
    /// The selection a fresh designer form starts from: the first flower,
    /// palette, style and shape of the catalog.
    pub fn with_catalog_defaults(catalog: &Catalog) -> Self {
        Self {
            flowers: catalog
                .flowers
                .first()
                .map(|flower| vec![flower.id.to_string()])
                .unwrap_or_default(),
            custom_flowers: String::new(),
            color_palette: catalog
                .palettes
                .first()
                .map(|palette| PaletteChoice::catalog(palette.id))
                .unwrap_or_else(|| PaletteChoice::custom("", Vec::new())),
            arrangement_style: catalog
                .styles
                .first()
                .map(|style| Choice::catalog(style.id))
                .unwrap_or_else(|| Choice::custom("")),
            size: Size::Medium,
            shape: catalog
                .shapes
                .first()
                .map(|shape| Choice::catalog(*shape))
                .unwrap_or_else(|| Choice::custom("")),
            negative_prompt: String::new(),
            extras: String::new(),
        }
    }

    /// Random flowers (two to five, no repeats) and random catalog picks for
    /// every other choice. Free-text fields are cleared.
    pub fn surprise<R: Rng>(catalog: &Catalog, rng: &mut R) -> Self {
        let mut config = Self::with_catalog_defaults(catalog);

        let max_flowers = catalog.flowers.len().min(5);
        let count = if max_flowers >= 2 {
            rng.gen_range(2..=max_flowers)
        } else {
            max_flowers
        };
        config.flowers = catalog
            .flowers
            .choose_multiple(rng, count)
            .map(|flower| flower.id.to_string())
            .collect();

        if let Some(palette) = catalog.palettes.choose(rng) {
            config.color_palette = PaletteChoice::catalog(palette.id);
        }
        if let Some(style) = catalog.styles.choose(rng) {
            config.arrangement_style = Choice::catalog(style.id);
        }
        if let Some(size) = catalog.sizes.choose(rng) {
            config.size = *size;
        }
        if let Some(shape) = catalog.shapes.choose(rng) {
            config.shape = Choice::catalog(*shape);
        }

        config
    }

    /// Overwrites the fields a preset carries; free-text fields stay as they are.
    pub fn apply_preset(&mut self, preset: &Preset) {
        let preset = &preset.config;
        self.flowers = preset.flowers.iter().map(|id| id.to_string()).collect();
        self.color_palette = PaletteChoice::catalog(preset.color_palette);
        self.arrangement_style = Choice::catalog(preset.arrangement_style);
        self.size = preset.size;
        self.shape = Choice::catalog(preset.shape);
    }

    /// Whether anything was asked for that a recipe could list.
    pub fn has_requested_flowers(&self) -> bool {
        !self.flowers.is_empty() || !self.custom_flowers.trim().is_empty()
    }
}

/// What an image analysis could confidently match. Missing fields mean
/// "leave the current selection alone".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBouquetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flowers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrangement_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
}

impl PartialBouquetConfig {
    pub fn is_empty(&self) -> bool {
        self.flowers.is_none()
            && self.color_palette.is_none()
            && self.arrangement_style.is_none()
            && self.shape.is_none()
    }

    pub fn apply_to(&self, config: &mut BouquetConfig) {
        if let Some(flowers) = &self.flowers {
            config.flowers = flowers.clone();
        }
        if let Some(id) = &self.color_palette {
            config.color_palette = PaletteChoice::catalog(id.clone());
        }
        if let Some(id) = &self.arrangement_style {
            config.arrangement_style = Choice::catalog(id.clone());
        }
        if let Some(shape) = &self.shape {
            config.shape = Choice::catalog(shape.clone());
        }
    }
}

/// The four answers of the quick-create form. Values are matched against the
/// quick tables; anything unrecognised gets a generic phrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickBrief {
    #[serde(deserialize_with = "budget_text")]
    pub budget: String,
    pub vibe: String,
    pub colors: String,
    pub occasion: String,
}

impl Default for QuickBrief {
    fn default() -> Self {
        Self {
            budget: DEFAULT_BUDGET.to_string(),
            vibe: String::new(),
            colors: String::new(),
            occasion: String::new(),
        }
    }
}

// The form posts budgets as strings ("200+") but plain numbers are accepted too.
fn budget_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBudget {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawBudget::deserialize(deserializer)? {
        RawBudget::Text(text) => text,
        RawBudget::Number(number) => number.to_string(),
    })
}
