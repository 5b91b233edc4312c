use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static SCRIPT_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("script").unwrap());

/// A parsed snapshot of the activity page.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(html: &str) -> Self {
        Page {
            html: Html::parse_document(html),
        }
    }

    /// First element matching the earliest selector in `priority` that matches anything.
    pub fn select_first<'a>(&'a self, priority: &[&Selector]) -> Option<ElementRef<'a>> {
        priority
            .iter()
            .find_map(|sel| self.html.select(sel).next())
    }

    /// Raw text of every `<script>` element, in document order.
    pub fn scripts(&self) -> impl Iterator<Item = String> + '_ {
        self.html
            .select(&SCRIPT_SEL)
            .map(|el| el.text().collect::<String>())
    }
}

/// Concatenated, trimmed text content of an element.
pub fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
