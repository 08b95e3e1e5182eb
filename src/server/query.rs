use std::collections::HashMap;

use super::request::HttpError;

const PATH_QUERY_SEPARATOR: char = '?';
const ELEMENTS_SEPARATOR: char = '&';
const KEY_VALUE_SEPARATOR: char = '=';

// array-style parameters (`ids[]=1&ids[]=2`) are not supported
const ARRAY_SUFFIX: &str = "[]";

/// Query parameters of a request target, one value per name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decode the query part of a request target.
///
/// Names ending in `[]` are dropped, a repeated name keeps its first value
/// and values are taken verbatim.
pub fn parse_query(target: &str) -> Result<QueryParams, HttpError> {
    let mut params = HashMap::new();

    let Some((_, query)) = target.split_once(PATH_QUERY_SEPARATOR) else {
        return Ok(QueryParams(params));
    };

    for elem in query.split(ELEMENTS_SEPARATOR) {
        if elem.is_empty() {
            continue;
        }

        let (key, value) = elem
            .split_once(KEY_VALUE_SEPARATOR)
            .ok_or_else(|| HttpError::MalformedQuery(elem.to_string()))?;

        if key.ends_with(ARRAY_SUFFIX) {
            continue;
        }

        params
            .entry(key.to_string())
            .or_insert_with(|| value.to_string());
    }

    Ok(QueryParams(params))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_params_are_dropped() {
        let params = parse_query("/jopa?sobaka=123&sdfss=www&arr[]=xxx&arr[]=www").unwrap();

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("sobaka"), Some("123"));
        assert_eq!(params.get("sdfss"), Some("www"));
        assert!(!params.contains("arr"));
        assert!(!params.contains("arr[]"));
    }

    #[test]
    fn test_no_query_is_empty() {
        assert!(parse_query("/auth").unwrap().is_empty());
        assert!(parse_query("/auth?").unwrap().is_empty());
    }

    #[test]
    fn test_splits_on_first_separators_only() {
        let params = parse_query("/auth?next=/a?b=c&code=x=y").unwrap();

        assert_eq!(params.get("next"), Some("/a?b=c"));
        assert_eq!(params.get("code"), Some("x=y"));
    }

    #[test]
    fn test_first_value_wins() {
        let params = parse_query("/auth?code=first&code=second").unwrap();
        assert_eq!(params.get("code"), Some("first"));
    }

    #[test]
    fn test_empty_value_and_trailing_separator() {
        let params = parse_query("/auth?error=&code=abc&").unwrap();

        assert_eq!(params.get("error"), Some(""));
        assert_eq!(params.get("code"), Some("abc"));
    }

    #[test]
    fn test_element_without_equals_is_malformed() {
        let result = parse_query("/auth?code");
        assert!(matches!(result, Err(HttpError::MalformedQuery(e)) if e == "code"));
    }
}
