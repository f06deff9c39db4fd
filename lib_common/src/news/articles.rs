//! Article download and paragraph extraction.
//!
//! News pages are large and mostly script; the article body is what sits
//! inside `<p>` elements. Tags inside a paragraph (links, emphasis) are
//! dropped, common HTML entities decoded and whitespace collapsed.

use std::time::Duration;

use regex::Regex;

use crate::retrieve::ky_http::ApiClient;

/// Compiled patterns used to pull paragraph text out of HTML.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    paragraph: Regex,
    tag: Regex,
    noise: Regex,
    entity: Regex,
}

impl ArticleExtractor {
    /// Compiles the extraction patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            paragraph: Regex::new(r"(?is)<p(?:\s[^>]*)?>(.*?)</p\s*>")?,
            tag: Regex::new(r"(?s)<[^>]*>")?,
            noise: Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)\s*>")?,
            entity: Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);")?,
        })
    }

    /// Text of every non-empty `<p>` element, one per line.
    pub fn extract(&self, html: &str) -> String {
        let html = self.noise.replace_all(html, " ");

        self.paragraph
            .captures_iter(&html)
            .filter_map(|caps| {
                let inner = caps.get(1)?.as_str();
                let text = self.tag.replace_all(inner, " ");
                let text = self.decode_entities(&text);
                let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
                (!text.is_empty()).then_some(text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn decode_entities(&self, text: &str) -> String {
        self.entity
            .replace_all(text, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                decode_entity(name).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from);
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "rsquo" | "lsquo" => "'",
        "rdquo" | "ldquo" => "\"",
        "mdash" | "ndash" => "-",
        "hellip" => "...",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// One-shot helper around [`ArticleExtractor::extract`].
pub fn extract_article_text(html: &str) -> Result<String, regex::Error> {
    Ok(ArticleExtractor::new()?.extract(html))
}

/// Downloads `url` and returns its paragraph text.
///
/// # Errors
/// Network failures, non-2xx answers and pages without any paragraph.
pub async fn fetch_article_text(
    url: &str,
    extractor: &ArticleExtractor,
    timeout: Duration,
) -> anyhow::Result<String> {
    let client = ApiClient::new(url, None, timeout)?;
    let response = client.get_text("").await?;

    if !response.success {
        anyhow::bail!("HTTP {} while fetching {}", response.status, url);
    }

    let html = response.data.unwrap_or_default();
    let text = extractor.extract(&html);
    if text.is_empty() {
        anyhow::bail!("no article text found at {}", url);
    }

    log::debug!("Extracted {} characters from {}", text.len(), url);
    Ok(text)
}
