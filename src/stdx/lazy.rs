/// Compiles a CSS selector once, on first use.
macro_rules! selector {
    ($selector:literal) => {{
        static SELECTOR: std::sync::LazyLock<::scraper::Selector> = std::sync::LazyLock::new(|| {
            ::scraper::Selector::parse($selector)
                .expect(concat!("`", $selector, "` should be a valid selector"))
        });
        &*SELECTOR
    }};
}

/// Compiles a regular expression once, on first use.
macro_rules! regex {
    ($regex:literal) => {{
        static REGEX: std::sync::LazyLock<::regex::Regex> = std::sync::LazyLock::new(|| {
            ::regex::Regex::new($regex).expect(concat!("`", $regex, "` should be a valid regex"))
        });
        &*REGEX
    }};
}

pub(crate) use regex;
pub(crate) use selector;
