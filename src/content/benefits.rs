//! Service benefits are edited as one line per benefit and stored as a list.

use serde::{Deserialize, Serialize};

/// Benefits as sent by the editor: either a ready list or the raw text box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BenefitsInput {
    List(Vec<String>),
    Text(String),
}

impl BenefitsInput {
    /// Normalized list: entries trimmed, blank entries dropped.
    pub fn into_list(self) -> Vec<String> {
        match self {
            Self::List(items) => clean(items.iter().map(String::as_str)),
            Self::Text(text) => parse_benefits(&text),
        }
    }
}

/// Splits the text box on newlines. Blank lines are silently dropped.
pub fn parse_benefits(text: &str) -> Vec<String> {
    clean(text.split('\n'))
}

/// Text box contents for an existing list.
pub fn benefits_text(benefits: &[String]) -> String {
    benefits.join("\n")
}

fn clean<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_blank_lines_and_trims() {
        let text = "Custom gypsum ceilings\n\n   \n  LED cove lighting  \r\nAcoustic panels\n";
        assert_eq!(
            parse_benefits(text),
            vec![
                "Custom gypsum ceilings".to_string(),
                "LED cove lighting".to_string(),
                "Acoustic panels".to_string(),
            ]
        );
    }

    #[test]
    fn test_join_then_parse_returns_original_list() {
        let original = vec![
            "Built-in wardrobes".to_string(),
            "Kitchen cabinets".to_string(),
            "Premium hardware".to_string(),
        ];
        assert_eq!(parse_benefits(&benefits_text(&original)), original);
    }

    #[test]
    fn test_empty_list_round_trips_to_empty() {
        assert_eq!(parse_benefits(&benefits_text(&[])), Vec::<String>::new());
    }

    #[test]
    fn test_input_accepts_list_or_text() {
        let list: BenefitsInput = serde_json::from_str(r#"["a", " ", "b "]"#).unwrap();
        assert_eq!(list.into_list(), vec!["a".to_string(), "b".to_string()]);

        let text: BenefitsInput = serde_json::from_str(r#""a\n\nb""#).unwrap();
        assert_eq!(text.into_list(), vec!["a".to_string(), "b".to_string()]);
    }
}
