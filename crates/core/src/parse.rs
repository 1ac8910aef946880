//! HTML parsing and DOM traversal.
//!
//! Thin wrappers over `scraper` that turn selector failures into
//! [`ChartError::Parse`] and expose the handful of queries the extractor
//! needs.
//!
//! # Example
//!
//! ```rust
//! use billboard_core::parse::Document;
//!
//! let html = r#"<ul class="row"><li><h3 class="c-title">Song</h3></li></ul>"#;
//! let doc = Document::parse(html);
//! let rows = doc.select("ul.row").unwrap();
//! assert_eq!(rows[0].select_first("h3.c-title").unwrap().unwrap().text(), "Song");
//! ```

use scraper::{Html, Selector};

use crate::text::collapse_whitespace;
use crate::{ChartError, Result};

/// Compiles a CSS selector.
///
/// # Errors
///
/// Returns [`ChartError::Parse`] if the selector is invalid.
pub fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ChartError::parse(format!("Invalid selector \"{}\": {}", selector, e), None))
}

/// A parsed HTML page.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document. Malformed markup is repaired, never rejected.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the underlying `scraper::Html`.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects every element matching a CSS selector, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Parse`] if the selector is invalid.
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|element| Element { element }).collect())
    }

    /// Selects the first element matching a CSS selector.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|element| Element { element }))
    }

    /// Gets the text of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        self.select_first("title").ok().flatten().map(|el| el.text())
    }
}

/// A single element of a [`Document`].
#[derive(Clone, Copy, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Concatenated text of all descendant text nodes, untouched.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Text with whitespace trimmed and collapsed.
    pub fn clean_text(&self) -> String {
        collapse_whitespace(&self.text())
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Lowercase tag name.
    pub fn tag_name(&self) -> &'a str {
        self.element.value().name()
    }

    /// Selects descendants matching a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::Parse`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|element| Element { element }).collect())
    }

    /// Selects the first descendant matching a CSS selector.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(|element| Element { element }))
    }

    /// Outer HTML, mostly useful in diagnostics.
    pub fn outer_html(&self) -> String {
        self.element.html()
    }
}
