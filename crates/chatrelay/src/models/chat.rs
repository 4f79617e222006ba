use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Longest title derived from a first message
pub const MAX_TITLE_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn new<S: Into<String>, T: Into<String>>(id: S, title: T, visibility: Visibility) -> Self {
        Chat {
            id: id.into(),
            title: title.into(),
            visibility,
            created_at: Utc::now(),
        }
    }
}

/// Derive a chat title from the text of its first message
pub fn derive_title(text: &str) -> String {
    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty());
    match first_line {
        Some(line) => line.chars().take(MAX_TITLE_CHARS).collect(),
        None => "New chat".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title() {
        assert_eq!(derive_title("  hello there \nsecond"), "hello there");
        assert_eq!(derive_title(""), "New chat");
        assert_eq!(derive_title(&"x".repeat(200)).chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!(Visibility::default(), Visibility::Private);
        assert_eq!(serde_json::to_string(&Visibility::Public).unwrap(), "\"public\"");
    }
}
