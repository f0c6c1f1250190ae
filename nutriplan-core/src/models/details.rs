use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-text metadata printed around the schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDetails {
    pub title: String,
    pub description: String,
    pub guidelines: String,
    pub supplements: String,
}

impl PlanDetails {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    pub fn with_supplements(mut self, supplements: impl Into<String>) -> Self {
        self.supplements = supplements.into();
        self
    }

    pub fn get(&self, field: DetailField) -> &str {
        match field {
            DetailField::Title => &self.title,
            DetailField::Description => &self.description,
            DetailField::Guidelines => &self.guidelines,
            DetailField::Supplements => &self.supplements,
        }
    }

    pub fn set(&mut self, field: DetailField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DetailField::Title => self.title = value,
            DetailField::Description => self.description = value,
            DetailField::Guidelines => self.guidelines = value,
            DetailField::Supplements => self.supplements = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailField {
    Title,
    Description,
    Guidelines,
    Supplements,
}

impl fmt::Display for DetailField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailField::Title => write!(f, "title"),
            DetailField::Description => write!(f, "description"),
            DetailField::Guidelines => write!(f, "guidelines"),
            DetailField::Supplements => write!(f, "supplements"),
        }
    }
}

impl FromStr for DetailField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(DetailField::Title),
            "description" => Ok(DetailField::Description),
            "guidelines" | "notes" => Ok(DetailField::Guidelines),
            "supplements" => Ok(DetailField::Supplements),
            _ => Err(format!(
                "Invalid detail '{}'. Valid options: title, description, guidelines, supplements",
                s
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_builder_and_set() {
        let mut details = PlanDetails::new("Cut")
            .with_description("Four week plan")
            .with_guidelines("Drink water");
        assert_eq!(details.get(DetailField::Title), "Cut");
        assert_eq!(details.get(DetailField::Supplements), "");

        details.set(DetailField::Supplements, "Vitamin D");
        assert_eq!(details.supplements, "Vitamin D");
    }

    #[test]
    fn test_detail_field_from_str() {
        assert_eq!(DetailField::from_str("Notes").unwrap(), DetailField::Guidelines);
        assert!(DetailField::from_str("author").is_err());
        assert_eq!(DetailField::Title.to_string(), "title");
    }

    #[test]
    fn test_details_deserialize_partial() {
        let details: PlanDetails = serde_json::from_str(r#"{"title": "Bulk"}"#).unwrap();
        assert_eq!(details.title, "Bulk");
        assert!(details.description.is_empty());
    }
}
