use crate::core::types::PriceFetchResult;
use crate::extract::{heuristic, sites, structured};
use reqwest::{header, Client, Url};
use scraper::Html;
use tracing::debug;

/// Best-effort price scrape for a retailer product page. Infallible by
/// contract: every failure mode maps to a `success=false` result.
pub struct PriceExtractor {
    client: Client,
    accept_language: String,
}

impl PriceExtractor {
    pub fn new(client: Client, accept_language: impl Into<String>) -> Self {
        Self {
            client,
            accept_language: accept_language.into(),
        }
    }

    pub async fn fetch_price_from_url(&self, url: &str) -> PriceFetchResult {
        if url.trim().is_empty() {
            return PriceFetchResult::failure("", "Empty URL");
        }

        let resp = match self
            .client
            .get(url)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await
        {
            Ok(resp) => resp,
            // DNS, TLS, timeout, connect failures
            Err(e) => return PriceFetchResult::failure(domain_of(url), e.to_string()),
        };

        // Final post-redirect URL; this is where the page actually lives
        let domain = effective_domain(resp.url());
        let status = resp.status().as_u16();
        if !(200..400).contains(&status) {
            return PriceFetchResult::failure(domain, format!("HTTP {}", status));
        }

        let body = match resp.text().await {
            Ok(body) => body,
            Err(e) => return PriceFetchResult::failure(domain, e.to_string()),
        };
        if body.trim().is_empty() {
            return PriceFetchResult::failure(domain, "Empty response body");
        }

        debug!(%domain, bytes = body.len(), "page fetched");
        extract_from_html(&domain, &body)
    }
}

/// Parser chain over an already-fetched page, first success wins:
/// site-specific parser, generic structured data, generic HTML heuristic.
pub fn extract_from_html(domain: &str, body: &str) -> PriceFetchResult {
    let doc = Html::parse_document(body);

    if let Some(site) = sites::site_parser_for(domain) {
        if let Some(price) = site.extract(&doc, body) {
            return PriceFetchResult::found(price, site.name);
        }
    }

    if let Some((price, method)) = structured::structured_price(&doc) {
        return PriceFetchResult::found(price, format!("{} ({})", domain, method));
    }

    if let Some(price) = heuristic::heuristic_price(&doc) {
        return PriceFetchResult::found(price, format!("{} (html pattern)", domain));
    }

    PriceFetchResult::failure(domain, "No price found on page")
}

fn effective_domain(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    host.trim_start_matches("www.").to_string()
}

fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| effective_domain(&u))
        .unwrap_or_default()
}
