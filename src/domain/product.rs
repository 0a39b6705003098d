use serde::{Deserialize, Serialize};

/// Separators that mark the end of the useful part of a listing title.
const TITLE_SEPARATORS: [char; 3] = [',', '|', '-'];

/// One product card's extracted fields. Any field may be missing on the page;
/// records without a title are dropped before the dataset is returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<String>,
    #[serde(rename = "Star Rating")]
    pub rating: Option<String>,
}

impl ProductRecord {
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Truncate a raw title at the first separator character by string position.
///
/// The earliest occurrence of any separator wins, whichever member of the set
/// it is: "Omega-3, Fish Oil" cuts at the hyphen, not the comma.
pub fn normalize_title(raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let kept = match raw.find(TITLE_SEPARATORS) {
        Some(at) => &raw[..at],
        None => raw.as_str(),
    };
    Some(kept.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::normalize_title;

    #[test]
    fn normalize_title_without_separator_only_trims() {
        let result = normalize_title(Some("  Zinc Picolinate 50mg ".to_string()));
        assert_eq!(result, Some("Zinc Picolinate 50mg".to_string()));
    }

    #[test]
    fn normalize_title_cuts_at_first_comma() {
        let result = normalize_title(Some("Best Vitamin C, 500mg".to_string()));
        assert_eq!(result, Some("Best Vitamin C".to_string()));
    }

    #[test]
    fn normalize_title_cuts_at_pipe() {
        let result = normalize_title(Some("Magnesium Glycinate | 120 Capsules".to_string()));
        assert_eq!(result, Some("Magnesium Glycinate".to_string()));
    }

    #[test]
    fn normalize_title_position_beats_separator_order() {
        // The hyphen comes before the comma, so the cut happens there even
        // though the comma is listed first in the separator set.
        let result = normalize_title(Some("Omega-3, Fish Oil 1000mg".to_string()));
        assert_eq!(result, Some("Omega".to_string()));
    }

    #[test]
    fn normalize_title_none_stays_none() {
        assert_eq!(normalize_title(None), None);
    }
}
