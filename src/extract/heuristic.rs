use crate::extract::sanitize::sanitize_price;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

// Plausibility window for a tire price. Anything outside is assumed to be an
// unrelated on-page number (shipping, accessories, ratings).
const PLAUSIBLE_MIN: u32 = 30;
const PLAUSIBLE_MAX: u32 = 1500;

lazy_static! {
    static ref NUM_RE: Regex = Regex::new(r"([0-9][0-9,]*(?:\.[0-9]{1,2})?)").unwrap();
}

fn plausible(price: Decimal) -> bool {
    price >= Decimal::from(PLAUSIBLE_MIN) && price <= Decimal::from(PLAUSIBLE_MAX)
}

/// Last-resort scrape: numeric candidates from elements whose class contains
/// "price", then from `data-price` attributes. The first candidate inside the
/// plausibility window wins; first occurrence is assumed to be the primary
/// listing price, so no min/max selection.
pub fn heuristic_price(doc: &Html) -> Option<Decimal> {
    let class_sel = Selector::parse(r#"[class*="price"]"#).unwrap();
    for el in doc.select(&class_sel) {
        let text: String = el.text().collect();
        for cap in NUM_RE.captures_iter(&text) {
            if let Some(price) = sanitize_price(&cap[1]) {
                if plausible(price) {
                    return Some(price);
                }
            }
        }
    }

    let data_sel = Selector::parse("[data-price]").unwrap();
    for el in doc.select(&data_sel) {
        if let Some(price) = el.value().attr("data-price").and_then(sanitize_price) {
            if plausible(price) {
                return Some(price);
            }
        }
    }

    None
}
