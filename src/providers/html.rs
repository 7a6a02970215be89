//! Card extraction shared by the HTML scraping providers

use crate::{
    error::{SearchError, SearchResult},
    types::SearchResult as SearchResultType,
    utils::http,
};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// CSS selectors describing one provider's result card markup
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    /// Repeated container, one per result
    pub card: &'static str,
    /// Element holding the title text
    pub title: &'static str,
    /// Element whose `href` is the result link
    pub link: &'static str,
    /// Optional description element
    pub description: &'static str,
    /// Extra element a card must contain to count as a result
    pub required: Option<&'static str>,
}

struct CompiledLayout {
    card: Selector,
    title: Selector,
    link: Selector,
    description: Selector,
    required: Option<Selector>,
}

fn selector(css: &str) -> SearchResult<Selector> {
    Selector::parse(css)
        .map_err(|_| SearchError::ParseError(format!("Invalid CSS selector '{css}'")))
}

impl CardLayout {
    fn compile(&self) -> SearchResult<CompiledLayout> {
        Ok(CompiledLayout {
            card: selector(self.card)?,
            title: selector(self.title)?,
            link: selector(self.link)?,
            description: selector(self.description)?,
            required: self.required.map(selector).transpose()?,
        })
    }
}

/// Extract every result card from `html`, served from `page_url`.
///
/// Relative links resolve against `page_url`. Cards missing a title or a
/// usable link are skipped. A document without cards yields no results; a
/// body without any markup is a parse error.
pub fn parse_cards(
    html: &str,
    page_url: &str,
    layout: &CardLayout,
) -> SearchResult<Vec<SearchResultType>> {
    if !http::looks_like_markup(html) {
        return Err(SearchError::ParseError(
            "Response body is not an HTML document".to_string(),
        ));
    }

    let page = Url::parse(page_url)?;
    let compiled = layout.compile()?;
    let document = Html::parse_document(html);

    let results = document
        .select(&compiled.card)
        .filter_map(|card| parse_card(card, &page, &compiled))
        .collect();

    Ok(results)
}

fn parse_card(
    card: ElementRef<'_>,
    page: &Url,
    layout: &CompiledLayout,
) -> Option<SearchResultType> {
    if let Some(required) = &layout.required {
        card.select(required).next()?;
    }

    let title = card.select(&layout.title).next()?;
    let link = card
        .select(&layout.link)
        .next()?
        .value()
        .attr("href")
        .and_then(|href| http::resolve_link(page, href))?;

    let snippet = card
        .select(&layout.description)
        .next()
        .map(element_text)
        .unwrap_or_default();

    Some(SearchResultType::new(
        element_text(title),
        link,
        snippet,
    ))
}

fn element_text(element: ElementRef<'_>) -> String {
    http::clean_text(&element.text().collect::<String>())
}
