//! Search box target.

const SEARCH_URL: &str = "https://www.google.com/search?q=";

/// Web search URL for `query`, or `None` when it is blank.
pub fn search_url(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    Some(format!("{}{}", SEARCH_URL, urlencoding::encode(query)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url() {
        assert_eq!(
            search_url("rust lifetimes").as_deref(),
            Some("https://www.google.com/search?q=rust%20lifetimes")
        );
        assert_eq!(
            search_url("  a&b=c ").as_deref(),
            Some("https://www.google.com/search?q=a%26b%3Dc")
        );
    }

    #[test]
    fn test_blank_query() {
        assert_eq!(search_url(""), None);
        assert_eq!(search_url("   "), None);
    }
}
