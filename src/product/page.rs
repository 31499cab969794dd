// src/product/page.rs
// =============================================================================
// This module pulls links and the ingredient text out of catalog pages.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
//
// A Page only stores the raw body. The DOM is built on demand inside each
// accessor and dropped before it returns, because scraper's Html can't be
// sent between threads and must never be held across an .await.
//
// Layout assumptions (the catalog's markup):
// - listing pages: <ul class="pagination"> whose last two links are
//   "next" and "last", and <a class="main-thumb"> per product
// - product pages: <p class="ingr"> holding the composition
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// The URL we asked for
    url: String,
    /// Where the body actually came from (differs after a redirect)
    base: String,
    body: String,
}

impl Page {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            base: url.clone(),
            url,
            body: body.into(),
        }
    }

    // Relative links on a redirected page resolve against the final URL
    pub fn served_from(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }

    // Every page link in the pagination control except the trailing two
    //
    // Example: [1, 2, 3, next, last] -> [1, 2, 3]
    pub fn pagination_links(&self) -> Vec<String> {
        let document = self.document();

        let Some(pagination) = document.select(&selector("ul.pagination")).next() else {
            return Vec::new();
        };

        let hrefs: Vec<&str> = pagination
            .select(&selector("a[href]"))
            .filter_map(|a| a.value().attr("href"))
            .collect();

        let page_count = hrefs.len().saturating_sub(2);
        hrefs[..page_count]
            .iter()
            .filter_map(|href| self.resolve(href))
            .collect()
    }

    /// Links to single products found on a listing page
    pub fn product_links(&self) -> Vec<String> {
        let document = self.document();

        document
            .select(&selector("a.main-thumb[href]"))
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| self.resolve(href))
            .collect()
    }

    /// Lower-cased ingredient list, or None when the page has no such field
    pub fn composition(&self) -> Option<String> {
        let document = self.document();

        document
            .select(&selector("p.ingr"))
            .next()
            .map(|element| text_of(element).to_lowercase())
    }

    // Resolves a possibly-relative href against the URL the page was served from
    //
    // Examples (page = "https://shop.example/catalog/shampoo"):
    //   "/item-1"                    -> "https://shop.example/item-1"
    //   "https://shop.example/item"  -> unchanged
    //   "javascript:void(0)"         -> None (not HTTP)
    fn resolve(&self, href: &str) -> Option<String> {
        let resolved = match Url::parse(href) {
            Ok(url) => url,
            Err(_) => Url::parse(&self.base).ok()?.join(href).ok()?,
        };

        match resolved.scheme() {
            "http" | "https" => Some(resolved.to_string()),
            _ => None,
        }
    }
}

// Selectors in this crate are string constants, so a parse failure is a
// programmer error rather than something to recover from
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap()
}

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <div class="product"><a class="main-thumb" href="/shampoo-argan">img</a></div>
          <div class="product"><a class="main-thumb" href="https://shop.example/shampoo-mint">img</a></div>
          <div class="product"><a class="title" href="/not-a-thumb">name</a></div>
          <ul class="pagination">
            <li><a href="/catalog/shampoo/page-1">1</a></li>
            <li><a href="/catalog/shampoo/page-2">2</a></li>
            <li><a href="/catalog/shampoo/page-3">3</a></li>
            <li><a href="/catalog/shampoo/page-2">&gt;</a></li>
            <li><a href="/catalog/shampoo/page-3">&gt;|</a></li>
          </ul>
        </body></html>
    "#;

    #[test]
    fn test_pagination_drops_navigation_entries() {
        let page = Page::new("https://shop.example/catalog/shampoo", LISTING);
        assert_eq!(
            page.pagination_links(),
            vec![
                "https://shop.example/catalog/shampoo/page-1",
                "https://shop.example/catalog/shampoo/page-2",
                "https://shop.example/catalog/shampoo/page-3",
            ]
        );
    }

    #[test]
    fn test_no_pagination_control() {
        let page = Page::new("https://shop.example/catalog/shampoo", "<p>one page only</p>");
        assert!(page.pagination_links().is_empty());
    }

    #[test]
    fn test_pagination_with_only_navigation() {
        let html = r#"<ul class="pagination"><li><a href="/a">&gt;</a></li><li><a href="/b">&gt;|</a></li></ul>"#;
        let page = Page::new("https://shop.example/catalog/shampoo", html);
        assert!(page.pagination_links().is_empty());
    }

    #[test]
    fn test_product_links_only_from_thumbnails() {
        let page = Page::new("https://shop.example/catalog/shampoo", LISTING);
        assert_eq!(
            page.product_links(),
            vec![
                "https://shop.example/shampoo-argan",
                "https://shop.example/shampoo-mint",
            ]
        );
    }

    #[test]
    fn test_composition_is_lowercased() {
        let html = r#"<p class="ingr">Aqua, <b>Glycerin</b>, Parfum</p>"#;
        let page = Page::new("https://shop.example/shampoo-argan", html);
        assert_eq!(page.composition().as_deref(), Some("aqua, glycerin, parfum"));
    }

    #[test]
    fn test_missing_composition() {
        let page = Page::new("https://shop.example/shampoo-argan", "<p>no ingredients</p>");
        assert_eq!(page.composition(), None);
    }

    #[test]
    fn test_links_resolve_against_final_url() {
        let html = r#"<a class="main-thumb" href="argan">x</a>"#;
        let page = Page::new("https://shop.example/catalog/shampoo", html)
            .served_from("https://shop.example/catalog/shampoo/");

        assert_eq!(page.url(), "https://shop.example/catalog/shampoo");
        assert_eq!(page.product_links(), vec!["https://shop.example/catalog/shampoo/argan"]);
    }

    #[test]
    fn test_skip_non_http_links() {
        let html = r#"<a class="main-thumb" href="javascript:void(0)">x</a>"#;
        let page = Page::new("https://shop.example/catalog/shampoo", html);
        assert!(page.product_links().is_empty());
    }
}
