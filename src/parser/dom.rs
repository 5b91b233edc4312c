use std::sync::LazyLock;

use scraper::Selector;

use super::page::{text_of, Page};

static TITLE_H1_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1.activity-name").unwrap());
static TITLE_ANY_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".activity-name").unwrap());
static MOVING_TIME_SEL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[data-glossary-term="moving_time"] .stat-text, .moving-time .stat-text"#)
        .unwrap()
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomFields {
    pub title: Option<String>,
    /// Rendered duration, kept verbatim. Only read when scripts gave none.
    pub duration: Option<String>,
}

pub fn extract(page: &Page, need_duration: bool) -> DomFields {
    let title = page
        .select_first(&[&*TITLE_H1_SEL, &*TITLE_ANY_SEL])
        .map(text_of);

    let duration = if need_duration {
        page.select_first(&[&*MOVING_TIME_SEL])
            .map(text_of)
            .filter(|t| !t.is_empty())
    } else {
        None
    };

    DomFields { title, duration }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h1_title_preferred() {
        let page = Page::parse(
            r#"<span class="activity-name">Sidebar</span><h1 class="activity-name">
                Lunch Run
            </h1>"#,
        );
        assert_eq!(extract(&page, false).title.as_deref(), Some("Lunch Run"));
    }

    #[test]
    fn any_activity_name_as_fallback() {
        let page = Page::parse(r#"<div class="activity-name">Evening Ride</div>"#);
        assert_eq!(extract(&page, false).title.as_deref(), Some("Evening Ride"));
    }

    #[test]
    fn rendered_duration_only_when_needed() {
        let html = r#"<ul><li data-glossary-term="moving_time"><strong class="stat-text"> 42:10 </strong></li></ul>"#;
        let page = Page::parse(html);
        assert_eq!(extract(&page, true).duration.as_deref(), Some("42:10"));
        assert_eq!(extract(&page, false).duration, None);
    }

    #[test]
    fn moving_time_class_shape() {
        let page = Page::parse(r#"<div class="moving-time"><span class="stat-text">1:02:03</span></div>"#);
        assert_eq!(extract(&page, true).duration.as_deref(), Some("1:02:03"));
    }

    #[test]
    fn nothing_found() {
        let page = Page::parse("<p>empty</p>");
        assert_eq!(extract(&page, true), DomFields::default());
    }
}
