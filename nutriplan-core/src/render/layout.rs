//! Section descriptors produced by [`super::render`]. Each describes what a
//! printed page shows; styling is left to whoever turns them into a document.

use serde::Serialize;
use std::fmt;

use super::classify::DishCategory;
use crate::models::{one_decimal, NutrientTotals};
use crate::nutrition::MacroSplit;

/// Nutrient figures formatted for print.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroSummary {
    pub calories: String,
    pub protein: String,
    pub carbohydrates: String,
    pub fats: String,
}

impl From<&NutrientTotals> for MacroSummary {
    fn from(totals: &NutrientTotals) -> Self {
        Self {
            calories: one_decimal(totals.calories),
            protein: one_decimal(totals.protein),
            carbohydrates: one_decimal(totals.carbohydrates),
            fats: one_decimal(totals.fats),
        }
    }
}

impl fmt::Display for MacroSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {} kcal | Protein: {} g | Carbs: {} g | Fats: {} g",
            self.calories, self.protein, self.carbohydrates, self.fats
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishCard {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroSummary>,
}

impl fmt::Display for DishCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {}", self.name)?;
        if let Some(serving_size) = &self.serving_size {
            write!(f, " ({})", serving_size)?;
        }
        if let Some(description) = &self.description {
            write!(f, "\n    {}", description)?;
        }
        if let Some(macros) = &self.macros {
            write!(f, "\n    {}", macros)?;
        }
        Ok(())
    }
}

/// A run of dishes printed under one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DishGroup {
    pub heading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<DishCategory>,
    pub dishes: Vec<DishCard>,
}

impl fmt::Display for DishGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(heading) = &self.heading {
            writeln!(f, "{}", heading)?;
        }
        for dish in &self.dishes {
            writeln!(f, "{}", dish)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotCard {
    pub slot_id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub groups: Vec<DishGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub macros: Option<MacroSummary>,
}

impl SlotCard {
    pub fn dish_count(&self) -> usize {
        self.groups.iter().map(|group| group.dishes.len()).sum()
    }
}

impl fmt::Display for SlotCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.time {
            Some(time) => writeln!(f, "{} [{}]", self.label.to_uppercase(), time)?,
            None => writeln!(f, "{}", self.label.to_uppercase())?,
        }
        if let Some(macros) = &self.macros {
            writeln!(f, "{}", macros)?;
        }
        for group in &self.groups {
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pairing {
    FullWidth,
    TwoColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageBreak {
    /// May continue on the next page.
    Flow,
    AvoidInside,
}

/// One or two slot cards laid out together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotBlock {
    pub pairing: Pairing,
    pub page_break: PageBreak,
    pub slots: Vec<SlotCard>,
}

impl fmt::Display for SlotBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                writeln!(f, "    ||")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacroSection {
    pub period: String,
    pub label: String,
    pub totals: MacroSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<MacroSummary>,
    pub split: MacroSplit,
}

impl fmt::Display for MacroSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Macros - {}", self.label)?;
        writeln!(f, "Total:  {}", self.totals)?;
        if let Some(targets) = &self.targets {
            writeln!(f, "Target: {}", targets)?;
        }
        writeln!(
            f,
            "Split:  protein {}% | carbs {}% | fats {}%",
            self.split.protein, self.split.carbohydrates, self.split.fats
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleSection {
    pub period: String,
    pub label: String,
    pub blocks: Vec<SlotBlock>,
}

impl ScheduleSection {
    pub fn slots(&self) -> impl Iterator<Item = &SlotCard> {
        self.blocks.iter().flat_map(|block| block.slots.iter())
    }
}

impl fmt::Display for ScheduleSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.label)?;
        writeln!(f, "{}", "=".repeat(self.label.chars().count()))?;
        for block in &self.blocks {
            writeln!(f)?;
            write!(f, "{}", block)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "section", content = "body", rename_all = "snake_case")]
pub enum PageSection {
    Description(String),
    Guidelines(String),
    Supplements(String),
    Macros(MacroSection),
    Schedule(ScheduleSection),
}

fn write_titled(f: &mut fmt::Formatter<'_>, title: &str, body: &str) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(title.len()))?;
    writeln!(f, "{}", body.trim())
}

impl fmt::Display for PageSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSection::Description(text) => write_titled(f, "Description", text),
            PageSection::Guidelines(text) => write_titled(f, "Guidelines", text),
            PageSection::Supplements(text) => write_titled(f, "Supplements", text),
            PageSection::Macros(section) => write!(f, "{}", section),
            PageSection::Schedule(section) => write!(f, "{}", section),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_macro_summary_one_decimal() {
        let summary = MacroSummary::from(&NutrientTotals::new(1500.0, 40.26, 0.0, 12.0));
        assert_eq!(summary.calories, "1500.0");
        assert_eq!(summary.carbohydrates, "0.0");
        assert_eq!(
            summary.to_string(),
            "Calories: 1500.0 kcal | Protein: 40.3 g | Carbs: 0.0 g | Fats: 12.0 g"
        );
    }

    #[test]
    fn test_page_section_serializes_tagged() {
        let section = PageSection::Guidelines("Drink water".to_string());
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            json!({"section": "guidelines", "body": "Drink water"})
        );
    }

    #[test]
    fn test_slot_card_display() {
        let card = SlotCard {
            slot_id: "breakfast".to_string(),
            label: "Breakfast".to_string(),
            time: Some("8:00".to_string()),
            groups: vec![DishGroup {
                heading: None,
                category: None,
                dishes: vec![DishCard {
                    name: "Oats".to_string(),
                    description: None,
                    serving_size: Some("1 bowl".to_string()),
                    time: None,
                    image: None,
                    macros: None,
                }],
            }],
            macros: None,
        };
        assert_eq!(card.dish_count(), 1);
        assert_eq!(card.to_string(), "BREAKFAST [8:00]\n- Oats (1 bowl)\n");
    }
}
