//! Filter navigation into structured values

use serde_json::Value;

/// One step of a filter path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterStep {
    Key(String),
    Index(usize),
}

impl std::fmt::Display for FilterStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterStep::Key(key) => f.write_str(key),
            FilterStep::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for FilterStep {
    fn from(s: &str) -> Self {
        FilterStep::Key(s.to_string())
    }
}

impl From<usize> for FilterStep {
    fn from(index: usize) -> Self {
        FilterStep::Index(index)
    }
}

/// Parse a dotted filter path (`items.0.a`); all-digit segments become indices
pub fn parse_filter(path: &str) -> Vec<FilterStep> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.parse::<usize>() {
            Ok(index) => FilterStep::Index(index),
            Err(_) => FilterStep::Key(segment.to_string()),
        })
        .collect()
}

/// Descend into `value` step by step.
///
/// Returns the selected sub-value, or `Err(step)` naming the first step that
/// could not be resolved. An index step against an object looks up the
/// stringified key.
pub fn apply_filter<'a>(value: &'a Value, filter: &[FilterStep]) -> Result<&'a Value, String> {
    let mut current = value;
    for step in filter {
        let next = match (step, current) {
            (FilterStep::Key(key), Value::Object(map)) => map.get(key),
            (FilterStep::Index(index), Value::Object(map)) => map.get(&index.to_string()),
            (FilterStep::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };
        current = next.ok_or_else(|| step.to_string())?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("items.0.a"),
            vec![
                FilterStep::Key("items".into()),
                FilterStep::Index(0),
                FilterStep::Key("a".into())
            ]
        );
        assert!(parse_filter("").is_empty());
    }

    #[test]
    fn test_apply_filter_descends() {
        let value = json!({"items": [{"a": 1}]});
        let filter: Vec<FilterStep> = vec!["items".into(), FilterStep::Index(0), "a".into()];
        assert_eq!(apply_filter(&value, &filter), Ok(&json!(1)));
    }

    #[test]
    fn test_apply_filter_missing_step() {
        let value = json!({"items": [{"a": 1}]});
        let filter: Vec<FilterStep> = vec!["items".into(), FilterStep::Index(0), "missing".into()];
        assert_eq!(apply_filter(&value, &filter), Err("missing".to_string()));
    }

    #[test]
    fn test_apply_filter_index_on_object() {
        let value = json!({"0": "zero"});
        assert_eq!(apply_filter(&value, &[FilterStep::Index(0)]), Ok(&json!("zero")));
    }

    #[test]
    fn test_apply_filter_key_on_array() {
        let value = json!([1, 2]);
        assert!(apply_filter(&value, &[FilterStep::Key("a".into())]).is_err());
    }

    #[test]
    fn test_apply_empty_filter() {
        let value = json!({"a": 1});
        assert_eq!(apply_filter(&value, &[]), Ok(&value));
    }
}
