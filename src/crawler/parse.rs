use std::sync::OnceLock;

use scraper::{ElementRef, Html, Selector};

use crate::listing::RawListing;

/// A result card from a guest search page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCard {
    pub title: Option<String>,
    pub company: Option<String>,
    pub date: Option<String>,
    pub link: Option<String>,
    pub promoted: bool,
}

impl JobCard {
    pub fn into_listing(self, description: Option<String>) -> RawListing {
        RawListing {
            title: self.title,
            company: self.company,
            date: self.date,
            link: self.link,
            description,
        }
    }
}

struct Selectors {
    card: Selector,
    title: Selector,
    company: Selector,
    date: Selector,
    link: Selector,
    description: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let parse = |s: &str| Selector::parse(s).expect("static selector parses");
        Selectors {
            card: parse("div.base-card"),
            title: parse("h3.base-search-card__title"),
            company: parse("h4.base-search-card__subtitle"),
            date: parse("time"),
            link: parse("a.base-card__full-link"),
            description: parse("div.show-more-less-html__markup, div.description__text"),
        }
    })
}

pub fn parse_search_results(html: &str) -> Vec<JobCard> {
    let doc = Html::parse_document(html);
    let sel = selectors();

    doc.select(&sel.card)
        .map(|card| JobCard {
            title: first_text(card, &sel.title),
            company: first_text(card, &sel.company),
            date: card.select(&sel.date).next().and_then(|t| {
                t.value()
                    .attr("datetime")
                    .map(str::to_string)
                    .or_else(|| non_empty(joined_text(t, " ")))
            }),
            link: card
                .select(&sel.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(strip_tracking),
            promoted: card
                .text()
                .any(|t| t.trim().eq_ignore_ascii_case("promoted")),
        })
        .collect()
}

/// Description text of a job page, one line per text node.
pub fn parse_description(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let el = doc.select(&selectors().description).next()?;
    Some(joined_text(el, "\n"))
}

fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .and_then(|el| non_empty(joined_text(el, " ")))
}

fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Job links carry per-impression tracking parameters; drop them so the same
/// posting always has the same link.
fn strip_tracking(href: &str) -> String {
    href.split('?').next().unwrap_or(href).to_string()
}
