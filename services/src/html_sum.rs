//! Sums numeric `data-value` attributes of `div.foo` elements.

use scraper::{Html, Selector};

use crate::{error::ServiceError, text::parse_float};

/// Elements whose `data-value` contributes to the sum.
pub const VALUE_SELECTOR: &str = "div.foo";

/// Returns the sum of every parseable `data-value` under [`VALUE_SELECTOR`].
///
/// A missing attribute counts as `"0"`. Values that do not parse as a float
/// are skipped; `_` digit grouping is accepted, non-ASCII digits are not.
pub fn sum_data_values(html: &str) -> Result<f64, ServiceError> {
    let selector = Selector::parse(VALUE_SELECTOR).map_err(|e| ServiceError::Selector {
        selector: VALUE_SELECTOR,
        reason: e.to_string(),
    })?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&selector)
        .filter_map(|el| parse_value(el.value().attr("data-value")))
        .fold(0.0, |acc, v| acc + v))
}

fn parse_value(raw: Option<&str>) -> Option<f64> {
    parse_float(raw.unwrap_or("0"))
}
