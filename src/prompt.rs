//! Turns a bouquet selection into the text instructions sent to the model.
//!
//! Every lookup that misses the catalog (stale ID, empty custom text) resolves
//! to a generic phrase, so building a prompt never fails.

use crate::{
    bouquet::{BouquetConfig, Choice, PaletteChoice, QuickBrief},
    catalog::{Catalog, DEFAULT_BUDGET},
};

pub const FALLBACK_STYLE: &str = "beautiful";
pub const FALLBACK_PALETTE: &str = "colorful";
pub const FALLBACK_CUSTOM_PALETTE: &str = "a beautiful custom color scheme";
pub const FALLBACK_SHAPE: &str = "classic";
pub const FALLBACK_FLOWERS: &str = "seasonal flowers chosen by the florist";

const PHOTOGRAPHY_DIRECTIVES: &str = "\
The composition and style (These rules are critical for a consistent look):
- Background: A seamless, flat, neutral, light gray studio background (#E6E6E6).
- Framing: The bouquet is perfectly centered in the frame.
- Lighting: Lit with a large, diffuse softbox from the front-right to create soft, flattering light and gentle shadows. There is a subtle fill light to soften contrast. No harsh lighting, no dramatic shadows, no lens flares.
- Shadow: A soft, natural contact shadow is visible directly beneath the bouquet/vase.
- Camera: Shot with a 50mm prime lens at f/8 on a full-frame camera for a clean look with moderate depth of field. The camera angle is level with the middle of the bouquet.
- Style: The final image must look like a high-end, minimalist product photo. It should be clean, sharp, and aesthetically pleasing. The contrast and saturation are neutral and true to life.";

const BASE_CONSTRAINTS: &str = "\
Constraints (What to avoid):
- Absolutely no people, hands, text, logos, or distracting elements.
- The background must be completely plain and uniform.
- Avoid any \"artistic\" effects like vignettes, heavy grain, or dramatic color grading. The look is clean and commercial.";

#[derive(Clone, Copy)]
pub struct PromptBuilder<'a> {
    catalog: &'a Catalog,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Display names of the picked flowers in pick order, unknown IDs dropped,
    /// followed by the free-text addendum.
    pub fn flower_names(&self, config: &BouquetConfig) -> Vec<String> {
        let mut names: Vec<String> = config
            .flowers
            .iter()
            .filter_map(|id| self.catalog.flower(id))
            .map(|flower| flower.name.to_string())
            .collect();

        let custom = config.custom_flowers.trim();
        if !custom.is_empty() {
            names.push(custom.to_string());
        }
        names
    }

    pub fn flower_list(&self, config: &BouquetConfig) -> String {
        self.flower_names(config).join(", ")
    }

    pub fn style_description(&self, choice: &Choice) -> String {
        match choice {
            Choice::Catalog { id } => self
                .catalog
                .style(id)
                .map(|style| style.description)
                .unwrap_or(FALLBACK_STYLE)
                .to_string(),
            Choice::Custom { text } => non_empty_or(text, FALLBACK_STYLE),
        }
    }

    pub fn palette_description(&self, choice: &PaletteChoice) -> String {
        match choice {
            PaletteChoice::Catalog { id } => self
                .catalog
                .palette(id)
                .map(|palette| palette.description)
                .unwrap_or(FALLBACK_PALETTE)
                .to_string(),
            PaletteChoice::Custom { text, colors } => {
                let mut description = non_empty_or(text, FALLBACK_CUSTOM_PALETTE);
                let swatches: Vec<&str> = colors
                    .iter()
                    .map(|color| color.trim())
                    .filter(|color| !color.is_empty())
                    .collect();
                if !swatches.is_empty() {
                    description.push_str(". The palette must specifically include these colors: ");
                    description.push_str(&swatches.join(", "));
                }
                description
            }
        }
    }

    pub fn shape_description(&self, choice: &Choice) -> String {
        match choice {
            Choice::Catalog { id } => self
                .catalog
                .shape(id)
                .unwrap_or(FALLBACK_SHAPE)
                .to_string(),
            Choice::Custom { text } => non_empty_or(text, FALLBACK_SHAPE),
        }
    }

    /// Studio product-photo prompt for the preview image.
    pub fn image_prompt(&self, config: &BouquetConfig) -> String {
        let flowers = self.flower_list(config);
        let flowers = if flowers.is_empty() {
            FALLBACK_FLOWERS.to_string()
        } else {
            flowers
        };

        let mut subject = vec![
            format!(
                "- Arrangement Style: {}.",
                self.style_description(&config.arrangement_style)
            ),
            format!(
                "- Shape: A {} {} bouquet.",
                config.size,
                self.shape_description(&config.shape)
            ),
            format!("- Featured Flowers: A beautiful, harmonious combination of {flowers}."),
            format!(
                "- Color Palette: The bouquet strictly adheres to {}.",
                with_article(&self.palette_description(&config.color_palette))
            ),
        ];

        let extras = config.extras.trim();
        if !extras.is_empty() {
            subject.push(format!(
                "- Embellishments: It is tastefully adorned with {extras}."
            ));
        }

        let mut prompt = format!(
            "Create an ultra-realistic, chic, and elegant studio product photograph of a florist's bouquet.\n\nThe bouquet subject:\n{}\n\n{PHOTOGRAPHY_DIRECTIVES}\n\n{BASE_CONSTRAINTS}",
            subject.join("\n")
        );

        let negative = config.negative_prompt.trim();
        if !negative.is_empty() {
            prompt.push_str(" Also avoid: ");
            prompt.push_str(negative);
        }

        prompt
    }

    /// Recipe request sent together with the generated image. `None` when
    /// nothing resolvable was requested, in which case no recipe is asked for.
    pub fn recipe_prompt(&self, config: &BouquetConfig) -> Option<String> {
        let flowers = self.flower_list(config);
        if flowers.is_empty() {
            return None;
        }

        let size = config.size.label().to_lowercase();
        Some(format!(
            "You are a professional florist creating a recipe for the bouquet in the provided image. \
The original request was for a {size} bouquet featuring these specific flowers: {flowers}.

Your task is to create a detailed and accurate recipe to replicate the bouquet shown in the image.
- First, analyze the image to identify all visible flowers and foliage, including any fillers.
- Your recipe **must include every flower** from the original request list ({flowers}), even if it is hard to see in the image.
- Based on the image and the requested size, determine a realistic stem quantity for each item in the recipe.
- For each item, provide an estimated current wholesale price per stem in AUD (e.g., '$2.50').
The final recipe should be a plausible list of ingredients to create this exact bouquet. \
Return ONLY a JSON object of the form {{\"recipe\": [{{\"name\": string, \"quantity\": integer, \"pricePerStem\": string}}]}}, without any markdown formatting."
        ))
    }

    /// Classification request for an uploaded photo, constrained to catalog names.
    pub fn analysis_prompt(&self) -> String {
        let flowers = join_names(self.catalog.flowers.iter().map(|f| f.name));
        let palettes = join_names(self.catalog.palettes.iter().map(|p| p.name));
        let styles = join_names(self.catalog.styles.iter().map(|s| s.name));
        let shapes = join_names(self.catalog.shapes.iter().copied());

        format!(
            "Analyze this image of a flower bouquet. Identify the main flower types (choose from the provided list), \
the overall color palette (choose from list), and the arrangement style and shape (choose from lists). \
Return this information as a JSON object with \"flowers\" (array of names), \"colorPalette\" (single name), \
\"arrangementStyle\" (single name), and \"shape\" (single name) properties. \
Leave out any property you cannot match confidently.

Available flowers: [{flowers}]
Available palettes: [{palettes}]
Available styles: [{styles}]
Available shapes: [{shapes}]"
        )
    }

    /// Prompt for the four-question quick-create form.
    pub fn quick_prompt(&self, brief: &QuickBrief) -> String {
        let tables = &self.catalog.quick;
        let colors = tables.color_description(brief.colors.trim());
        let vibe = tables.vibe_description(brief.vibe.trim());
        let occasion = tables.occasion_description(brief.occasion.trim());
        let budget = match brief.budget.trim().trim_start_matches('$') {
            "" => DEFAULT_BUDGET,
            budget => budget,
        };

        format!(
            "Create a stunning professional photograph of a floral bouquet arrangement. The bouquet should be:

- {colors} flowers
- {vibe} style
- Perfect for {occasion}
- Price range around ${budget}
- Shot with professional florist photography lighting
- Clean white or soft neutral background
- High-end floral shop quality
- Wrapped beautifully in complementary paper or placed in an elegant vase
- Sharp focus with artistic shallow depth of field
- Natural, fresh-looking flowers with visible texture and detail

The arrangement should look like something from a premium local florist, handcrafted with care and attention to detail."
        )
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    match text.trim() {
        "" => fallback.to_string(),
        text => text.to_string(),
    }
}

/// Prefixes "a " unless the phrase already opens with an article.
fn with_article(phrase: &str) -> String {
    let lower = phrase.to_ascii_lowercase();
    if ["a ", "an ", "the "].iter().any(|article| lower.starts_with(article)) {
        phrase.to_string()
    } else {
        format!("a {phrase}")
    }
}

fn join_names<'n>(names: impl Iterator<Item = &'n str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FALLBACK_COLORS, FALLBACK_OCCASION, FALLBACK_VIBE, Size};

    fn builder() -> PromptBuilder<'static> {
        PromptBuilder::new(Catalog::standard())
    }

    fn romance() -> BouquetConfig {
        BouquetConfig {
            flowers: vec!["roses".into(), "peonies".into()],
            color_palette: PaletteChoice::catalog("classic_romance"),
            arrangement_style: Choice::catalog("classic_round"),
            size: Size::Medium,
            shape: Choice::catalog("Round"),
            ..BouquetConfig::default()
        }
    }

    #[test]
    fn classic_romance_prompt_mentions_every_resolved_field() {
        let prompt = builder().image_prompt(&romance());

        assert!(prompt.to_lowercase().contains("roses, peonies"));
        assert!(prompt.contains(
            "a timeless and elegant combination of deep reds, blush pinks, and whites"
        ));
        assert!(prompt.contains("a traditional, compact, and dome-shaped bouquet"));
        assert!(prompt.contains("Medium"));
        assert!(prompt.contains("Round"));
        assert!(!prompt.contains("Embellishments"));
        assert!(!prompt.contains("Also avoid"));
    }

    #[test]
    fn catalog_choices_never_leak_the_custom_sentinel() {
        let catalog = Catalog::standard();
        let builder = builder();

        for palette in catalog.palettes {
            for style in catalog.styles {
                for shape in catalog.shapes {
                    let config = BouquetConfig {
                        flowers: vec!["tulips".into()],
                        color_palette: PaletteChoice::catalog(palette.id),
                        arrangement_style: Choice::catalog(style.id),
                        shape: Choice::catalog(*shape),
                        ..BouquetConfig::default()
                    };
                    let prompt = builder.image_prompt(&config);
                    assert!(prompt.contains(palette.description));
                    assert!(prompt.contains(style.description));
                    assert!(prompt.contains(shape));
                    assert!(!prompt.to_lowercase().contains("custom"), "{prompt}");
                }
            }
        }
    }

    #[test]
    fn custom_text_replaces_catalog_phrases() {
        let config = BouquetConfig {
            color_palette: PaletteChoice::custom("inky blues and silver", Vec::new()),
            arrangement_style: Choice::custom("tall and architectural"),
            shape: Choice::custom("crescent"),
            ..romance()
        };
        let prompt = builder().image_prompt(&config);

        assert!(prompt.contains("inky blues and silver"));
        assert!(prompt.contains("tall and architectural"));
        assert!(prompt.contains("A Medium crescent bouquet"));
        assert!(!prompt.contains("deep reds, blush pinks"));
        assert!(!prompt.contains("dome-shaped"));
    }

    #[test]
    fn empty_custom_text_falls_back_to_generic_phrases() {
        let builder = builder();
        assert_eq!(builder.style_description(&Choice::custom("  ")), FALLBACK_STYLE);
        assert_eq!(builder.shape_description(&Choice::custom("")), FALLBACK_SHAPE);
        assert_eq!(
            builder.palette_description(&PaletteChoice::custom("", Vec::new())),
            FALLBACK_CUSTOM_PALETTE
        );

        let prompt = builder.image_prompt(&BouquetConfig {
            arrangement_style: Choice::custom(""),
            shape: Choice::custom(""),
            ..romance()
        });
        assert!(prompt.contains("- Arrangement Style: beautiful."));
        assert!(prompt.contains("A Medium classic bouquet"));
        assert!(!prompt.contains("undefined"));
    }

    #[test]
    fn unknown_ids_fall_back_like_empty_custom_text() {
        let builder = builder();
        assert_eq!(builder.style_description(&Choice::catalog("baroque")), FALLBACK_STYLE);
        assert_eq!(
            builder.palette_description(&PaletteChoice::catalog("custom")),
            FALLBACK_PALETTE
        );
        assert_eq!(builder.shape_description(&Choice::catalog("Heart")), FALLBACK_SHAPE);
    }

    #[test]
    fn custom_swatches_are_listed() {
        let description = builder().palette_description(&PaletteChoice::custom(
            "jewel tones",
            vec!["#50C878".into(), " ".into(), "#0F52BA".into()],
        ));
        assert_eq!(
            description,
            "jewel tones. The palette must specifically include these colors: #50C878, #0F52BA"
        );
    }

    #[test]
    fn flower_order_and_duplicates_are_preserved() {
        let builder = builder();
        let pick = |ids: &[&str]| BouquetConfig {
            flowers: ids.iter().map(|id| id.to_string()).collect(),
            ..BouquetConfig::default()
        };

        assert_eq!(builder.flower_list(&pick(&["roses", "tulips"])), "Roses, Tulips");
        assert_eq!(builder.flower_list(&pick(&["tulips", "roses"])), "Tulips, Roses");
        assert_eq!(
            builder.flower_list(&pick(&["roses", "cactus", "roses"])),
            "Roses, Roses"
        );

        let mut config = pick(&["lilies"]);
        config.custom_flowers = " king proteas ".into();
        assert_eq!(builder.flower_list(&config), "Lilies, king proteas");
    }

    #[test]
    fn extras_and_negative_prompt_are_appended() {
        let config = BouquetConfig {
            extras: "a satin ribbon".into(),
            negative_prompt: "glitter".into(),
            ..romance()
        };
        let prompt = builder().image_prompt(&config);
        assert!(prompt.contains("- Embellishments: It is tastefully adorned with a satin ribbon."));
        assert!(prompt.ends_with("Also avoid: glitter"));
    }

    #[test]
    fn recipe_prompt_restates_every_requested_flower() {
        let mut config = romance();
        config.custom_flowers = "waxflower".into();
        let prompt = builder().recipe_prompt(&config).unwrap();

        assert!(prompt.contains("a medium bouquet"));
        assert!(prompt.contains("(Roses, Peonies, waxflower)"));
        assert!(prompt.contains("must include every flower"));
        assert!(prompt.contains("\"recipe\""));
    }

    #[test]
    fn palette_line_reads_with_a_single_article() {
        let builder = builder();

        let prompt = builder.image_prompt(&romance());
        assert!(prompt.contains(
            "strictly adheres to a timeless and elegant combination of deep reds"
        ));
        assert!(!prompt.contains("adheres to a a "));

        let unknown = BouquetConfig {
            color_palette: PaletteChoice::catalog("retired_palette"),
            ..romance()
        };
        assert!(builder
            .image_prompt(&unknown)
            .contains("strictly adheres to a colorful."));

        let custom = BouquetConfig {
            color_palette: PaletteChoice::custom("moody jewel tones", Vec::new()),
            ..romance()
        };
        assert!(builder
            .image_prompt(&custom)
            .contains("strictly adheres to a moody jewel tones."));
    }

    #[test]
    fn recipe_prompt_is_skipped_without_resolvable_flowers() {
        let config = BouquetConfig {
            flowers: vec!["cactus".into()],
            ..BouquetConfig::default()
        };
        assert!(builder().recipe_prompt(&config).is_none());
    }

    #[test]
    fn analysis_prompt_lists_catalog_names() {
        let prompt = builder().analysis_prompt();
        assert!(prompt.contains("Baby's Breath (filler)"));
        assert!(prompt.contains("Sunset Glow"));
        assert!(prompt.contains("Wild & Organic"));
        assert!(prompt.contains("Hand-tied"));
    }

    #[test]
    fn quick_prompt_uses_fallbacks_for_unknown_answers() {
        let brief = QuickBrief {
            budget: "$200+".into(),
            vibe: "gothic".into(),
            colors: "".into(),
            occasion: "retirement".into(),
        };
        let prompt = builder().quick_prompt(&brief);

        assert!(prompt.contains(&format!("- {FALLBACK_COLORS} flowers")));
        assert!(prompt.contains(&format!("- {FALLBACK_VIBE} style")));
        assert!(prompt.contains(&format!("Perfect for {FALLBACK_OCCASION}")));
        assert!(prompt.contains("Price range around $200+"));
    }

    #[test]
    fn quick_prompt_resolves_known_answers() {
        let brief = QuickBrief {
            budget: "100".into(),
            vibe: "romantic".into(),
            colors: "pastels".into(),
            occasion: "birthday".into(),
        };
        let prompt = builder().quick_prompt(&brief);
        assert!(prompt.contains("soft pastel pink, baby blue"));
        assert!(prompt.contains("romantic and dreamy"));
        assert!(prompt.contains("a birthday celebration"));
        assert!(prompt.contains("$100"));
    }
}
