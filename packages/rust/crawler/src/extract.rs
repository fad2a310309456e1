//! Small selector helpers shared by the listing and detail extractors.

use scraper::{ElementRef, Selector};

use grantha_markdown::element_text;

/// Parse a selector known at compile time.
pub(crate) fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// An extraction rule: yields a value, or nothing if it does not apply.
pub(crate) type Rule<'a, T> = &'a dyn Fn() -> Option<T>;

/// Try each rule in priority order; the first one that yields wins.
pub(crate) fn first_success<T>(rules: &[Rule<'_, T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule())
}

/// Non-empty text of the first element under `scope` matching `selector`.
pub(crate) fn select_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn first_success_respects_priority() {
        let calls = std::cell::Cell::new(0);
        let never: Rule<'_, &str> = &|| {
            calls.set(calls.get() + 1);
            None
        };
        let hit: Rule<'_, &str> = &|| Some("second");
        let late: Rule<'_, &str> = &|| Some("third");

        assert_eq!(first_success(&[never, hit, late]), Some("second"));
        assert_eq!(calls.get(), 1);
        assert_eq!(first_success::<&str>(&[never]), None);
    }

    #[test]
    fn select_text_skips_blank_matches() {
        let doc = Html::parse_fragment(r#"<div><span class="t">  </span><b class="u"> x  y </b></div>"#);
        let root = doc.root_element();
        assert_eq!(select_text(root, &sel(".t")), None);
        assert_eq!(select_text(root, &sel(".u")).as_deref(), Some("x y"));
        assert_eq!(select_text(root, &sel(".missing")), None);
    }
}
