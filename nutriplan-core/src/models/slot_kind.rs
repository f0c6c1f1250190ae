use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The meal occasions a day is built from, declared in serving order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    WakeUp,
    BeforeBreakfast,
    Breakfast,
    MidDayMeal,
    Lunch,
    PostLunchSnack,
    EveningSnack,
    Dinner,
    AfterDinner,
    BeforeSleep,
}

impl SlotKind {
    pub const ALL: [SlotKind; 10] = [
        SlotKind::WakeUp,
        SlotKind::BeforeBreakfast,
        SlotKind::Breakfast,
        SlotKind::MidDayMeal,
        SlotKind::Lunch,
        SlotKind::PostLunchSnack,
        SlotKind::EveningSnack,
        SlotKind::Dinner,
        SlotKind::AfterDinner,
        SlotKind::BeforeSleep,
    ];

    /// Identifier written into freshly seeded plans.
    pub fn slot_id(&self) -> &'static str {
        match self {
            SlotKind::WakeUp => "when_you_wake_up",
            SlotKind::BeforeBreakfast => "before_breakfast",
            SlotKind::Breakfast => "breakfast",
            SlotKind::MidDayMeal => "mid_day_meal",
            SlotKind::Lunch => "lunch",
            SlotKind::PostLunchSnack => "post_lunch_snack",
            SlotKind::EveningSnack => "evening_snack",
            SlotKind::Dinner => "dinner",
            SlotKind::AfterDinner => "after_dinner",
            SlotKind::BeforeSleep => "before_sleep",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SlotKind::WakeUp => "When You Wake Up",
            SlotKind::BeforeBreakfast => "Before Breakfast",
            SlotKind::Breakfast => "Breakfast",
            SlotKind::MidDayMeal => "Mid-day Meal",
            SlotKind::Lunch => "Lunch",
            SlotKind::PostLunchSnack => "Post Lunch Snack",
            SlotKind::EveningSnack => "Evening Snack",
            SlotKind::Dinner => "Dinner",
            SlotKind::AfterDinner => "After Dinner",
            SlotKind::BeforeSleep => "Before Sleep",
        }
    }

    /// Resolves a slot id, including the aliases older plans used, to its kind.
    pub fn from_slot_id(slot_id: &str) -> Option<Self> {
        let kind = match canonical_key(slot_id).as_str() {
            "when_you_wake_up" | "wake_up" | "wakeup" | "pre_wakeup" => SlotKind::WakeUp,
            "before_breakfast" | "pre_breakfast" | "early_morning" => SlotKind::BeforeBreakfast,
            "breakfast" => SlotKind::Breakfast,
            "mid_day_meal" | "midday_meal" => SlotKind::MidDayMeal,
            "lunch" => SlotKind::Lunch,
            "post_lunch_snack" | "post_lunch" | "postlunch" => SlotKind::PostLunchSnack,
            "evening_snack" | "snack" | "snacks" => SlotKind::EveningSnack,
            "dinner" | "night" => SlotKind::Dinner,
            "after_dinner" | "post_dinner" => SlotKind::AfterDinner,
            "before_sleep" | "pre_sleep" => SlotKind::BeforeSleep,
            _ => return None,
        };
        Some(kind)
    }

    pub fn priority(&self) -> usize {
        *self as usize
    }

    /// Lunch and dinner are served as a combination of categorized dishes.
    pub fn is_combination(&self) -> bool {
        matches!(self, SlotKind::Lunch | SlotKind::Dinner)
    }

    /// Early slots print their options as one plain list.
    pub fn is_single_column(&self) -> bool {
        matches!(self, SlotKind::WakeUp | SlotKind::BeforeBreakfast)
    }

    /// Large slots may flow across a page boundary when printed.
    pub fn is_large(&self) -> bool {
        matches!(
            self,
            SlotKind::Lunch | SlotKind::Dinner | SlotKind::MidDayMeal
        )
    }
}

/// Lowercases a raw slot id and joins its words with underscores.
pub fn canonical_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Sort key for a slot id: known kinds by serving order, everything else after.
pub fn slot_priority(slot_id: &str) -> usize {
    SlotKind::from_slot_id(slot_id)
        .map(|kind| kind.priority())
        .unwrap_or(usize::MAX)
}

/// Human readable label for any slot id.
pub fn slot_label(slot_id: &str) -> String {
    if let Some(kind) = SlotKind::from_slot_id(slot_id) {
        return kind.label().to_string();
    }
    let words: Vec<String> = slot_id
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect();
    if words.is_empty() {
        "Meal".to_string()
    } else {
        words.join(" ")
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slot_id())
    }
}

impl FromStr for SlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SlotKind::from_slot_id(s).ok_or_else(|| {
            format!(
                "Invalid slot '{}'. Valid options: {}",
                s,
                SlotKind::ALL
                    .iter()
                    .map(|k| k.slot_id())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        })
    }
}
