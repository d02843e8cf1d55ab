//! Validated text types shared across the keeper crates.
//!
//! Values of these types are checked once, at the boundary where they enter the system
//! (REST request bodies, query strings), so that the store and service layers can rely on
//! them without re-validating.

use std::fmt;
use std::str::FromStr;

/// Characters stripped from folder and file names before they are stored.
const FORBIDDEN_NAME_CHARS: [char; 4] = ['/', '\\', '\'', '"'];

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The name was empty once forbidden characters were removed
    #[error("not valid name")]
    InvalidName,
    /// The value is not one of the accepted sort directions
    #[error("unsupported order type: {0}")]
    InvalidOrder(String),
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A sanitised folder or file name.
///
/// Path separators and quote characters are removed, then the result is trimmed. Names
/// that end up empty are rejected, so an `EntryName` can always be used as a single path
/// segment when folder paths are joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Sanitises `input` into an entry name.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::InvalidName`] if nothing is left after sanitising.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let cleaned: String = input
            .as_ref()
            .chars()
            .filter(|c| !FORBIDDEN_NAME_CHARS.contains(c))
            .collect();
        let cleaned = cleaned.trim();
        if cleaned.is_empty() {
            return Err(TextError::InvalidName);
        }
        Ok(Self(cleaned.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    /// Parses an optional query-string value, falling back to ascending order for
    /// anything that is not a recognised direction.
    pub fn from_query_lenient(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for OrderDirection {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            other => Err(TextError::InvalidOrder(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  config  ").unwrap();
        assert_eq!(text.as_str(), "config");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let result: Result<NonEmptyText, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn entry_name_strips_forbidden_characters() {
        let name = EntryName::new("my/'app\"\\config").unwrap();
        assert_eq!(name.as_str(), "myappconfig");
    }

    #[test]
    fn entry_name_rejects_only_forbidden_characters() {
        assert_eq!(EntryName::new("//''\"\\"), Err(TextError::InvalidName));
        assert_eq!(EntryName::new(" / "), Err(TextError::InvalidName));
    }

    #[test]
    fn order_direction_parses_case_insensitively() {
        assert_eq!("DESC".parse::<OrderDirection>(), Ok(OrderDirection::Desc));
        assert_eq!("asc".parse::<OrderDirection>(), Ok(OrderDirection::Asc));
        assert!("sideways".parse::<OrderDirection>().is_err());
    }

    #[test]
    fn order_direction_lenient_defaults_to_asc() {
        assert_eq!(
            OrderDirection::from_query_lenient(Some("sideways")),
            OrderDirection::Asc
        );
        assert_eq!(OrderDirection::from_query_lenient(None), OrderDirection::Asc);
        assert_eq!(
            OrderDirection::from_query_lenient(Some("Desc")),
            OrderDirection::Desc
        );
    }
}
