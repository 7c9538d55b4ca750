//! Search request parameters.

use crate::Error;

/// Characters trimmed from both ends of a query.
const QUERY_TRIM: &[char] = &[' ', '\t', '\n'];

/// Parsed `q` / `page` parameters of a search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub query: String,
    /// 1-based unified page.
    pub page: u32,
}

impl SearchParams {
    /// Parse raw query-string values.
    ///
    /// All `q` values are joined with a space and trimmed. A missing, malformed
    /// or non-positive `page` silently becomes 1.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if `q` is absent or blank.
    pub fn parse<'a>(queries: impl IntoIterator<Item = &'a str>, page: Option<&str>) -> Result<Self, Error> {
        let values: Vec<&str> = queries.into_iter().collect();
        if values.is_empty() {
            return Err(Error::InvalidInput("query search parameter ?q= missing".into()));
        }

        let query = values.join(" ").trim_matches(QUERY_TRIM).to_string();
        if query.is_empty() {
            return Err(Error::InvalidInput("query search cannot be empty".into()));
        }

        let page = page
            .and_then(|p| p.parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);

        Ok(Self { query, page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_page() {
        let params = SearchParams::parse(["mountain lake"], Some("3")).unwrap();
        assert_eq!(params, SearchParams { query: "mountain lake".into(), page: 3 });
    }

    #[test]
    fn test_missing_query() {
        let result = SearchParams::parse(std::iter::empty(), Some("2"));
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("missing")));
    }

    #[test]
    fn test_blank_query() {
        let result = SearchParams::parse([" \t\n "], None);
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.contains("empty")));
    }

    #[test]
    fn test_multiple_values_are_joined() {
        let params = SearchParams::parse(["red", "car\n"], None).unwrap();
        assert_eq!(params.query, "red car");
    }

    #[test]
    fn test_page_defaults_to_one() {
        assert_eq!(SearchParams::parse(["x"], None).unwrap().page, 1);
        assert_eq!(SearchParams::parse(["x"], Some("abc")).unwrap().page, 1);
        assert_eq!(SearchParams::parse(["x"], Some("")).unwrap().page, 1);
        assert_eq!(SearchParams::parse(["x"], Some("0")).unwrap().page, 1);
        assert_eq!(SearchParams::parse(["x"], Some("-4")).unwrap().page, 1);
    }
}
