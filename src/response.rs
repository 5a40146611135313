//! Normalises what the model sends back into the designer's own types.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    bouquet::PartialBouquetConfig,
    capabilities::GeneratedImage,
    catalog::Catalog,
    errors::{Result, StudioError},
    providers::gemini::GenerateContentResponse,
    recipe::RecipeItem,
};

/// First inline part carrying a non-empty `image/*` payload.
pub fn first_image(response: &GenerateContentResponse) -> Option<GeneratedImage> {
    response.parts().find_map(|part| {
        let inline = part.inline_data.as_ref()?;
        if inline.mime_type.starts_with("image/") && !inline.data.is_empty() {
            Some(GeneratedImage::new(inline.mime_type.clone(), inline.data.clone()))
        } else {
            None
        }
    })
}

/// Strips a Markdown code fence that some models wrap around JSON even when
/// asked not to.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.starts_with("```json") {
        trimmed
            .trim_start_matches("```json")
            .trim_start_matches('`')
            .trim()
            .trim_end_matches("```")
            .trim()
    } else if trimmed.starts_with("```") {
        trimmed
            .trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
    } else {
        trimmed
    }
}

#[derive(Deserialize)]
struct RecipeResponse {
    recipe: Vec<RecipeItem>,
}

/// Parses `{"recipe": [...]}`. A missing array is a shape error, not an empty recipe.
pub fn parse_recipe(text: &str) -> Result<Vec<RecipeItem>> {
    let sanitized = strip_code_fence(text);
    serde_json::from_str::<RecipeResponse>(sanitized)
        .map(|response| response.recipe)
        .map_err(|err| StudioError::parse(format!("recipe JSON: {err}")))
}

/// Matches the model's classification against catalog names. Anything that
/// does not match is left out of the result.
pub fn parse_analysis(text: &str, catalog: &Catalog) -> Result<PartialBouquetConfig> {
    let sanitized = strip_code_fence(text);
    let value: Value = serde_json::from_str(sanitized)
        .map_err(|err| StudioError::parse(format!("analysis JSON: {err}")))?;
    let object = value
        .as_object()
        .ok_or_else(|| StudioError::parse("analysis JSON is not an object"))?;

    let flowers: Vec<String> = object
        .get("flowers")
        .and_then(Value::as_array)
        .map(|names| {
            names
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|name| catalog.flower_by_name(name))
                .map(|flower| flower.id.to_string())
                .collect()
        })
        .unwrap_or_default();

    let name_of = |key: &str| object.get(key).and_then(Value::as_str);

    Ok(PartialBouquetConfig {
        flowers: (!flowers.is_empty()).then_some(flowers),
        color_palette: name_of("colorPalette")
            .and_then(|name| catalog.palette_by_name(name))
            .map(|palette| palette.id.to_string()),
        arrangement_style: name_of("arrangementStyle")
            .and_then(|name| catalog.style_by_name(name))
            .map(|style| style.id.to_string()),
        shape: name_of("shape")
            .and_then(|name| catalog.shape_by_name(name))
            .map(str::to_string),
    })
}
