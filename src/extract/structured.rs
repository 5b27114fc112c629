use crate::extract::sanitize::sanitize_price;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use serde_json::Value;

/// Generic structured-data chain: JSON-LD product offers, then microdata
/// meta/inline itemprop, then Open Graph. Returns the price and a short
/// method tag for the result source.
pub fn structured_price(doc: &Html) -> Option<(Decimal, &'static str)> {
    if let Some(price) = json_ld_price(doc) {
        return Some((price, "json-ld"));
    }
    if let Some(price) = meta_itemprop_price(doc) {
        return Some((price, "meta"));
    }
    if let Some(price) = inline_itemprop_price(doc) {
        return Some((price, "itemprop"));
    }
    if let Some(price) = og_price(doc) {
        return Some((price, "og meta"));
    }
    None
}

/// First offer price found in any `application/ld+json` script describing a
/// Product (directly, in a root array, or flattened into `@graph`).
pub fn json_ld_price(doc: &Html) -> Option<Decimal> {
    let sel = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();
    for script in doc.select(&sel) {
        let text: String = script.text().collect();
        let Ok(value) = serde_json::from_str::<Value>(&text) else {
            // Retailers routinely ship broken JSON-LD; skip and keep looking
            continue;
        };
        if let Some(price) = price_from_ld_node(&value) {
            return Some(price);
        }
    }
    None
}

fn price_from_ld_node(node: &Value) -> Option<Decimal> {
    match node {
        Value::Array(items) => items.iter().find_map(price_from_ld_node),
        Value::Object(_) => {
            if let Some(graph) = node.get("@graph").and_then(Value::as_array) {
                if let Some(price) = graph.iter().find_map(price_from_ld_node) {
                    return Some(price);
                }
            }
            if !is_product(node) {
                return None;
            }
            offer_price(node.get("offers")?)
        }
        _ => None,
    }
}

fn is_product(node: &Value) -> bool {
    match node.get("@type") {
        Some(Value::String(t)) => t == "Product" || t == "IndividualProduct",
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t == "Product" || t == "IndividualProduct"),
        _ => false,
    }
}

fn offer_price(offers: &Value) -> Option<Decimal> {
    match offers {
        // Offer array: first entry carrying a usable price
        Value::Array(items) => items
            .iter()
            .find_map(|o| o.get("price").and_then(numeric_value)),
        // Single Offer or AggregateOffer
        Value::Object(_) => offers
            .get("price")
            .and_then(numeric_value)
            .or_else(|| offers.get("lowPrice").and_then(numeric_value)),
        _ => None,
    }
}

// JSON-LD prices show up both as strings and as bare numbers
fn numeric_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => sanitize_price(s),
        Value::Number(n) => sanitize_price(&n.to_string()),
        _ => None,
    }
}

pub fn meta_itemprop_price(doc: &Html) -> Option<Decimal> {
    let sel = Selector::parse(r#"meta[itemprop="price"]"#).unwrap();
    doc.select(&sel)
        .find_map(|el| el.value().attr("content").and_then(sanitize_price))
}

/// `itemprop="price"` on inline elements, where the price is the text content
/// (or a `content` attribute on non-meta tags).
pub fn inline_itemprop_price(doc: &Html) -> Option<Decimal> {
    let sel = Selector::parse(r#"[itemprop="price"]"#).unwrap();
    for el in doc.select(&sel) {
        if el.value().name() == "meta" {
            continue;
        }
        if let Some(price) = el.value().attr("content").and_then(sanitize_price) {
            return Some(price);
        }
        let text: String = el.text().collect();
        if let Some(price) = sanitize_price(&text) {
            return Some(price);
        }
    }
    None
}

pub fn og_price(doc: &Html) -> Option<Decimal> {
    let sel = Selector::parse(r#"meta[property="product:price:amount"]"#).unwrap();
    doc.select(&sel)
        .find_map(|el| el.value().attr("content").and_then(sanitize_price))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn test_json_ld_simple_offer() {
        let doc = parse(
            r#"<html><head><script type="application/ld+json">
            {"@type":"Product","name":"Defender LTX","offers":{"price":"249.99"}}
            </script></head><body></body></html>"#,
        );
        assert_eq!(json_ld_price(&doc), Some(dec("249.99")));
    }

    #[test]
    fn test_json_ld_numeric_price() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type":"Product","offers":{"price":249.99}}
            </script>"#,
        );
        assert_eq!(json_ld_price(&doc), Some(dec("249.99")));
    }

    #[test]
    fn test_json_ld_graph_array() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@context":"https://schema.org","@graph":[
              {"@type":"WebPage","name":"listing"},
              {"@type":"Product","offers":{"@type":"AggregateOffer","lowPrice":"189.00","highPrice":"240.00"}}
            ]}
            </script>"#,
        );
        assert_eq!(json_ld_price(&doc), Some(dec("189.00")));
    }

    #[test]
    fn test_json_ld_offer_array_takes_first_priced() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type":"IndividualProduct","offers":[
              {"availability":"OutOfStock"},
              {"price":"312.50"},
              {"price":"299.00"}
            ]}
            </script>"#,
        );
        assert_eq!(json_ld_price(&doc), Some(dec("312.50")));
    }

    #[test]
    fn test_json_ld_ignores_non_product() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type":"BreadcrumbList","offers":{"price":"99.99"}}
            </script>"#,
        );
        assert_eq!(json_ld_price(&doc), None);
    }

    #[test]
    fn test_json_ld_broken_json_is_skipped() {
        let doc = parse(
            r#"<script type="application/ld+json">{not json}</script>
            <script type="application/ld+json">
            {"@type":["Product","Thing"],"offers":{"price":"149.95"}}
            </script>"#,
        );
        assert_eq!(json_ld_price(&doc), Some(dec("149.95")));
    }

    #[test]
    fn test_meta_itemprop_either_attribute_order() {
        let doc = parse(r#"<meta itemprop="price" content="219.00">"#);
        assert_eq!(meta_itemprop_price(&doc), Some(dec("219.00")));

        let doc = parse(r#"<meta content="219.00" itemprop="price">"#);
        assert_eq!(meta_itemprop_price(&doc), Some(dec("219.00")));
    }

    #[test]
    fn test_inline_itemprop_text() {
        let doc = parse(r#"<span itemprop="price">$329.99</span>"#);
        assert_eq!(inline_itemprop_price(&doc), Some(dec("329.99")));
    }

    #[test]
    fn test_og_price() {
        let doc = parse(r#"<meta property="product:price:amount" content="189.99">"#);
        assert_eq!(og_price(&doc), Some(dec("189.99")));
        let doc = parse(r#"<meta content="189.99" property="product:price:amount">"#);
        assert_eq!(og_price(&doc), Some(dec("189.99")));
    }

    #[test]
    fn test_chain_prefers_json_ld() {
        let doc = parse(
            r#"<script type="application/ld+json">
            {"@type":"Product","offers":{"price":"100.00"}}
            </script>
            <meta itemprop="price" content="200.00">"#,
        );
        let (price, method) = structured_price(&doc).unwrap();
        assert_eq!(price, dec("100.00"));
        assert_eq!(method, "json-ld");
    }
}
