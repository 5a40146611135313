use serde::Serialize;

/// One button on the quick-create form and the phrase it contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickOption {
    pub value: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub description: &'static str,
}

/// Lookup tables for the four-question quick-create form. Kept apart from the
/// atelier catalog because that form speaks in vibes and occasions instead of
/// flower IDs.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuickTables {
    pub budgets: &'static [QuickOption],
    pub vibes: &'static [QuickOption],
    pub colors: &'static [QuickOption],
    pub occasions: &'static [QuickOption],
}

pub const FALLBACK_COLORS: &str = "colorful";
pub const FALLBACK_VIBE: &str = "beautiful";
pub const FALLBACK_OCCASION: &str = "a special occasion";
pub const DEFAULT_BUDGET: &str = "100";

impl QuickTables {
    pub const STANDARD: QuickTables = QuickTables {
        budgets: &[
            QuickOption { value: "50", label: "$50", description: "" },
            QuickOption { value: "100", label: "$100", description: "" },
            QuickOption { value: "150", label: "$150", description: "" },
            QuickOption { value: "200+", label: "$200+", description: "" },
        ],
        vibes: &[
            QuickOption {
                value: "romantic",
                label: "Romantic",
                description: "romantic and dreamy with soft textures and flowing shapes",
            },
            QuickOption {
                value: "modern",
                label: "Modern",
                description: "modern and minimalist with clean lines and architectural elements",
            },
            QuickOption {
                value: "rustic",
                label: "Rustic",
                description: "rustic and natural with wildflowers and organic textures",
            },
            QuickOption {
                value: "elegant",
                label: "Elegant",
                description: "elegant and sophisticated with classic roses and refined details",
            },
            QuickOption {
                value: "whimsical",
                label: "Whimsical",
                description: "whimsical and playful with unexpected combinations and fun elements",
            },
        ],
        colors: &[
            QuickOption {
                value: "purple-violet",
                label: "Purple & Violet",
                description: "deep purple, violet, lavender, and plum colored",
            },
            QuickOption {
                value: "pastels",
                label: "Soft Pastels",
                description: "soft pastel pink, baby blue, light lavender, and cream colored",
            },
            QuickOption {
                value: "bold-bright",
                label: "Bold & Bright",
                description: "vibrant red, orange, hot pink, and yellow colored",
            },
            QuickOption {
                value: "white-green",
                label: "White & Green",
                description: "pure white, cream, and lush green foliage",
            },
            QuickOption {
                value: "warm-tones",
                label: "Warm Tones",
                description: "warm peach, coral, terracotta, and golden yellow",
            },
        ],
        occasions: &[
            QuickOption {
                value: "birthday",
                label: "Birthday",
                description: "a birthday celebration, joyful and celebratory",
            },
            QuickOption {
                value: "anniversary",
                label: "Anniversary",
                description: "an anniversary, expressing enduring love",
            },
            QuickOption {
                value: "wedding",
                label: "Wedding",
                description: "a wedding ceremony, beautiful and memorable",
            },
            QuickOption {
                value: "sympathy",
                label: "Sympathy",
                description: "expressing sympathy, gentle and comforting",
            },
            QuickOption {
                value: "just-because",
                label: "Just Because",
                description: "a thoughtful everyday gift, bringing joy",
            },
        ],
    };

    pub fn color_description(&self, value: &str) -> &'static str {
        describe(self.colors, value).unwrap_or(FALLBACK_COLORS)
    }

    pub fn vibe_description(&self, value: &str) -> &'static str {
        describe(self.vibes, value).unwrap_or(FALLBACK_VIBE)
    }

    pub fn occasion_description(&self, value: &str) -> &'static str {
        describe(self.occasions, value).unwrap_or(FALLBACK_OCCASION)
    }
}

fn describe(options: &[QuickOption], value: &str) -> Option<&'static str> {
    options
        .iter()
        .find(|option| option.value == value)
        .map(|option| option.description)
}
