//! Closed set of product categories.

use crate::error::AppError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Product category. Names are matched case-sensitively; see [`Category::decode`] for the lenient form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    Unknown,
    Cloths,
    Food,
    Housewares,
    Automotive,
    Tools,
    Electronics,
}

impl Category {
    /// All members in declaration order.
    pub const ALL: [Category; 7] = [
        Category::Unknown,
        Category::Cloths,
        Category::Food,
        Category::Housewares,
        Category::Automotive,
        Category::Tools,
        Category::Electronics,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Unknown => "UNKNOWN",
            Category::Cloths => "CLOTHS",
            Category::Food => "FOOD",
            Category::Housewares => "HOUSEWARES",
            Category::Automotive => "AUTOMOTIVE",
            Category::Tools => "TOOLS",
            Category::Electronics => "ELECTRONICS",
        }
    }

    pub fn from_name(name: &str) -> Option<Category> {
        Category::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Decode the optional `category` key of a payload. Absent, non-string or unknown values yield `Unknown`.
    pub fn decode(value: Option<&Value>) -> Category {
        value
            .and_then(Value::as_str)
            .and_then(Category::from_name)
            .unwrap_or_default()
    }

    pub fn names() -> Vec<&'static str> {
        Category::ALL.iter().map(|c| c.name()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::from_name(s).ok_or_else(|| {
            AppError::BadRequest(format!(
                "unknown category '{}', expected one of: {}",
                s,
                Category::names().join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_round_trip_through_from_name() {
        for c in Category::ALL {
            assert_eq!(Category::from_name(c.name()), Some(c));
        }
    }

    #[test]
    fn from_name_is_case_sensitive() {
        assert_eq!(Category::from_name("FOOD"), Some(Category::Food));
        assert_eq!(Category::from_name("food"), None);
        assert_eq!(Category::from_name("Food"), None);
    }

    #[test]
    fn decode_falls_back_to_unknown() {
        assert_eq!(Category::decode(None), Category::Unknown);
        assert_eq!(Category::decode(Some(&json!("TOYS"))), Category::Unknown);
        assert_eq!(Category::decode(Some(&json!("tools"))), Category::Unknown);
        assert_eq!(Category::decode(Some(&json!(3))), Category::Unknown);
        assert_eq!(Category::decode(Some(&Value::Null)), Category::Unknown);
        assert_eq!(Category::decode(Some(&json!("TOOLS"))), Category::Tools);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert_eq!("ELECTRONICS".parse::<Category>().unwrap(), Category::Electronics);
        let err = "GADGETS".parse::<Category>().unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
