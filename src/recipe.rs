use serde::{Deserialize, Serialize};

/// One ingredient line suggested by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeItem {
    pub name: String,
    pub quantity: u32,
    /// Free-form currency text as returned by the model, e.g. `"$2.50"`.
    pub price_per_stem: String,
}

impl RecipeItem {
    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * parse_price(&self.price_per_stem)
    }
}

/// Reads the number out of a currency string. Anything unreadable counts as 0.
pub fn parse_price(text: &str) -> f64 {
    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Estimated bouquet cost. A display figure only.
pub fn total_cost(recipe: &[RecipeItem]) -> f64 {
    recipe.iter().map(RecipeItem::line_total).sum()
}

/// Formats an amount the way en-AU shows AUD: `$1,234.50`.
pub fn format_aud(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, digit) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}
