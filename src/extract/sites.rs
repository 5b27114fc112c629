use crate::extract::sanitize::sanitize_price;
use crate::extract::structured;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use scraper::{Html, Selector};

/// One known retailer: a domain substring to match against the effective
/// domain, a display name for the result source, and its parser.
pub struct SiteParser {
    pub matcher: &'static str,
    pub name: &'static str,
    parse: fn(&Html, &str) -> Option<Decimal>,
}

impl SiteParser {
    pub fn extract(&self, doc: &Html, body: &str) -> Option<Decimal> {
        (self.parse)(doc, body)
    }
}

// Tried in order; new retailers are added by appending an entry.
pub const SITE_PARSERS: &[SiteParser] = &[
    SiteParser {
        matcher: "tirerack.com",
        name: "tirerack.com",
        parse: parse_tirerack,
    },
    SiteParser {
        matcher: "simpletire.com",
        name: "simpletire.com",
        parse: parse_simpletire,
    },
    SiteParser {
        matcher: "amazon.com",
        name: "amazon.com",
        parse: parse_amazon,
    },
    SiteParser {
        matcher: "walmart.com",
        name: "walmart.com",
        parse: parse_walmart,
    },
];

pub fn site_parser_for(domain: &str) -> Option<&'static SiteParser> {
    SITE_PARSERS.iter().find(|s| domain.contains(s.matcher))
}

lazy_static! {
    // "price":"249.99" or "price":249.99 inside embedded JSON blobs
    static ref JSON_PRICE_RE: Regex =
        Regex::new(r#""price"\s*:\s*"?(\d[\d,]*\.?\d*)"?"#).unwrap();
    // Walmart's redux payload: "currentPrice":{"price":249.99,...}
    static ref WALMART_PRICE_RE: Regex =
        Regex::new(r#""currentPrice"\s*:\s*\{\s*"price"\s*:\s*(\d+\.?\d*)"#).unwrap();
}

fn parse_tirerack(doc: &Html, body: &str) -> Option<Decimal> {
    structured::json_ld_price(doc)
        .or_else(|| structured::meta_itemprop_price(doc))
        .or_else(|| json_blob_price(body))
}

fn parse_simpletire(doc: &Html, body: &str) -> Option<Decimal> {
    if let Some(price) = structured::json_ld_price(doc) {
        return Some(price);
    }
    let data_sel = Selector::parse("[data-price]").unwrap();
    for el in doc.select(&data_sel) {
        if let Some(price) = el.value().attr("data-price").and_then(sanitize_price) {
            return Some(price);
        }
    }
    json_blob_price(body)
}

fn parse_amazon(doc: &Html, _body: &str) -> Option<Decimal> {
    if let Some(price) = structured::json_ld_price(doc) {
        return Some(price);
    }
    // Buy-box price is duplicated into a screen-reader span
    let offscreen = Selector::parse("span.a-offscreen").unwrap();
    for el in doc.select(&offscreen) {
        let text: String = el.text().collect();
        if let Some(price) = sanitize_price(&text) {
            return Some(price);
        }
    }
    let priceblock = Selector::parse(r#"[id*="priceblock"]"#).unwrap();
    for el in doc.select(&priceblock) {
        let text: String = el.text().collect();
        if let Some(price) = sanitize_price(text.trim()) {
            return Some(price);
        }
    }
    None
}

fn parse_walmart(doc: &Html, body: &str) -> Option<Decimal> {
    if let Some(price) = structured::json_ld_price(doc) {
        return Some(price);
    }
    if let Some(price) = structured::meta_itemprop_price(doc)
        .or_else(|| structured::inline_itemprop_price(doc))
    {
        return Some(price);
    }
    WALMART_PRICE_RE
        .captures(body)
        .and_then(|cap| sanitize_price(&cap[1]))
}

fn json_blob_price(body: &str) -> Option<Decimal> {
    JSON_PRICE_RE
        .captures(body)
        .and_then(|cap| sanitize_price(&cap[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_site_lookup_by_domain_substring() {
        assert_eq!(site_parser_for("tirerack.com").unwrap().name, "tirerack.com");
        assert_eq!(site_parser_for("m.tirerack.com").unwrap().name, "tirerack.com");
        assert_eq!(site_parser_for("amazon.com").unwrap().name, "amazon.com");
        assert!(site_parser_for("discounttire.com").is_none());
    }

    #[test]
    fn test_tirerack_json_blob_fallback() {
        let body = r#"<html><script>var page = {"sku":"X","price":"214.99"};</script></html>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("tirerack.com").unwrap();
        assert_eq!(parser.extract(&doc, body), Some(dec("214.99")));
    }

    #[test]
    fn test_tirerack_prefers_json_ld() {
        let body = r#"<script type="application/ld+json">
            {"@type":"Product","offers":{"price":"199.00"}}
            </script><script>{"price":"999.00"}</script>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("tirerack.com").unwrap();
        assert_eq!(parser.extract(&doc, body), Some(dec("199.00")));
    }

    #[test]
    fn test_amazon_offscreen_span() {
        let body = r#"<span class="a-price"><span class="a-offscreen">$239.00</span></span>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("amazon.com").unwrap();
        assert_eq!(parser.extract(&doc, body), Some(dec("239.00")));
    }

    #[test]
    fn test_walmart_redux_payload() {
        let body = r#"<script>window.__data={"currentPrice":{"price":187.46,"currencyUnit":"USD"}}</script>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("walmart.com").unwrap();
        assert_eq!(parser.extract(&doc, body), Some(dec("187.46")));
    }

    #[test]
    fn test_simpletire_data_price() {
        let body = r#"<button data-price="156.99">Add to cart</button>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("simpletire.com").unwrap();
        assert_eq!(parser.extract(&doc, body), Some(dec("156.99")));
    }

    #[test]
    fn test_site_parser_falls_through_on_no_match() {
        let body = r#"<div>no prices here</div>"#;
        let doc = Html::parse_document(body);
        let parser = site_parser_for("walmart.com").unwrap();
        assert_eq!(parser.extract(&doc, body), None);
    }
}
