mod quick;

pub use quick::{DEFAULT_BUDGET, QuickTables};
#[cfg(test)]
pub use quick::{FALLBACK_COLORS, FALLBACK_OCCASION, FALLBACK_VIBE};

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlowerOption {
    pub id: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorPalette {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArrangementStyle {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Size {
    Small,
    #[default]
    Medium,
    Large,
    #[serde(rename = "Extra Large")]
    ExtraLarge,
}

impl Size {
    pub fn label(&self) -> &'static str {
        match self {
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
            Size::ExtraLarge => "Extra Large",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Fields a preset writes over the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetConfig {
    pub flowers: &'static [&'static str],
    pub color_palette: &'static str,
    pub arrangement_style: &'static str,
    pub size: Size,
    pub shape: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub name: &'static str,
    pub config: PresetConfig,
}

/// Every selectable option the designer knows about. Built once and shared
/// read-only by the prompt builder, the analyzer and the HTTP layer.
#[derive(Debug, Serialize)]
pub struct Catalog {
    pub flowers: &'static [FlowerOption],
    pub palettes: &'static [ColorPalette],
    pub styles: &'static [ArrangementStyle],
    pub sizes: &'static [Size],
    pub shapes: &'static [&'static str],
    pub presets: &'static [Preset],
    pub quick: QuickTables,
}

impl Catalog {
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    pub fn flower(&self, id: &str) -> Option<&FlowerOption> {
        self.flowers.iter().find(|flower| flower.id == id)
    }

    pub fn palette(&self, id: &str) -> Option<&ColorPalette> {
        self.palettes.iter().find(|palette| palette.id == id)
    }

    pub fn style(&self, id: &str) -> Option<&ArrangementStyle> {
        self.styles.iter().find(|style| style.id == id)
    }

    pub fn shape(&self, label: &str) -> Option<&'static str> {
        self.shapes.iter().copied().find(|shape| *shape == label)
    }

    pub fn preset(&self, name: &str) -> Option<&Preset> {
        self.presets
            .iter()
            .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
    }

    // Lookups by display name, used when reading a model's classification.

    pub fn flower_by_name(&self, name: &str) -> Option<&FlowerOption> {
        let name = name.trim();
        self.flowers
            .iter()
            .find(|flower| flower.name.eq_ignore_ascii_case(name))
    }

    pub fn palette_by_name(&self, name: &str) -> Option<&ColorPalette> {
        let name = name.trim();
        self.palettes
            .iter()
            .find(|palette| palette.name.eq_ignore_ascii_case(name))
    }

    pub fn style_by_name(&self, name: &str) -> Option<&ArrangementStyle> {
        let name = name.trim();
        self.styles
            .iter()
            .find(|style| style.name.eq_ignore_ascii_case(name))
    }

    pub fn shape_by_name(&self, name: &str) -> Option<&'static str> {
        let name = name.trim();
        self.shapes
            .iter()
            .copied()
            .find(|shape| shape.eq_ignore_ascii_case(name))
    }
}

static STANDARD: Catalog = Catalog {
    flowers: &[
        FlowerOption { id: "roses", name: "Roses" },
        FlowerOption { id: "lilies", name: "Lilies" },
        FlowerOption { id: "tulips", name: "Tulips" },
        FlowerOption { id: "peonies", name: "Peonies" },
        FlowerOption { id: "sunflowers", name: "Sunflowers" },
        FlowerOption { id: "daisies", name: "Daisies" },
        FlowerOption { id: "orchids", name: "Orchids" },
        FlowerOption { id: "carnations", name: "Carnations" },
        FlowerOption { id: "hydrangeas", name: "Hydrangeas" },
        FlowerOption { id: "eucalyptus", name: "Eucalyptus (filler)" },
        FlowerOption { id: "babys_breath", name: "Baby's Breath (filler)" },
        FlowerOption { id: "ranunculus", name: "Ranunculus" },
    ],
    palettes: &[
        ColorPalette {
            id: "pastel_dream",
            name: "Pastel Dream",
            description: "a soft, dreamy mix of pastel pinks, lavenders, and creamy whites",
            colors: &["#FADADD", "#E6E6FA", "#FFFACD"],
        },
        ColorPalette {
            id: "vibrant_meadow",
            name: "Vibrant Meadow",
            description: "a bold and cheerful palette of bright yellows, oranges, and hot pinks",
            colors: &["#FFEA00", "#FF8C00", "#FF69B4"],
        },
        ColorPalette {
            id: "classic_romance",
            name: "Classic Romance",
            description: "a timeless and elegant combination of deep reds, blush pinks, and whites",
            colors: &["#A52A2A", "#FBC4C4", "#FFFFFF"],
        },
        ColorPalette {
            id: "monochromatic_white",
            name: "Monochromatic White",
            description: "a sophisticated and clean palette of whites, ivories, and creams",
            colors: &["#FFFFFF", "#FFFFF0", "#F5F5DC"],
        },
        ColorPalette {
            id: "sunset_glow",
            name: "Sunset Glow",
            description: "a warm and radiant blend of peach, coral, and golden yellow tones",
            colors: &["#FFDAB9", "#FF7F50", "#FFC94E"],
        },
    ],
    styles: &[
        ArrangementStyle {
            id: "wild_organic",
            name: "Wild & Organic",
            description: "a loose, natural, and asymmetrical arrangement",
        },
        ArrangementStyle {
            id: "classic_round",
            name: "Classic Round",
            description: "a traditional, compact, and dome-shaped bouquet",
        },
        ArrangementStyle {
            id: "modern_minimalist",
            name: "Modern Minimalist",
            description: "a simple, clean, and structured arrangement focusing on form and lines",
        },
        ArrangementStyle {
            id: "cascading_waterfall",
            name: "Cascading Waterfall",
            description: "a dramatic, overflowing arrangement that drapes downwards",
        },
        ArrangementStyle {
            id: "rustic_charm",
            name: "Rustic Charm",
            description: "an arrangement with a natural, earthy, and slightly unrefined feel, often using textures like burlap or twine",
        },
        ArrangementStyle {
            id: "whimsical_garden",
            name: "Whimsical Garden",
            description: "a playful and enchanting style with a variety of flowers, colors, and textures, creating a magical look",
        },
    ],
    sizes: &[Size::Small, Size::Medium, Size::Large, Size::ExtraLarge],
    shapes: &["Round", "Asymmetrical", "Cascading", "Hand-tied", "Posy"],
    presets: &[
        Preset {
            name: "Romantic Gesture",
            config: PresetConfig {
                flowers: &["roses", "lilies", "eucalyptus"],
                color_palette: "classic_romance",
                arrangement_style: "classic_round",
                size: Size::Medium,
                shape: "Round",
            },
        },
        Preset {
            name: "Sunshine in a Vase",
            config: PresetConfig {
                flowers: &["sunflowers", "daisies", "babys_breath"],
                color_palette: "vibrant_meadow",
                arrangement_style: "wild_organic",
                size: Size::Large,
                shape: "Hand-tied",
            },
        },
        Preset {
            name: "Elegant Simplicity",
            config: PresetConfig {
                flowers: &["orchids", "tulips"],
                color_palette: "monochromatic_white",
                arrangement_style: "modern_minimalist",
                size: Size::Small,
                shape: "Posy",
            },
        },
    ],
    quick: QuickTables::STANDARD,
};
