use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{DetailField, PeriodMode};
use crate::path::Path;

/// An edit requested by the user, applied by [`super::apply`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// Starts over with the default periods of `mode`.
    SelectPeriodMode { mode: PeriodMode },
    SelectPeriod { period: String },
    SelectSlot { slot_id: String },
    /// Adds, renames or removes a slot of the current period.
    SaveSlotMeta {
        slot_id: String,
        mode: SlotMetaMode,
        #[serde(default)]
        index: Option<usize>,
    },
    ReorderSlots { old_index: usize, new_index: usize },
    /// Adds or patches a dish in the selected slot.
    SaveDish {
        #[serde(default)]
        target: DishTarget,
        payload: Value,
        #[serde(default)]
        is_new: bool,
        #[serde(default)]
        option_id: Option<String>,
    },
    DeleteDish {
        target: DishTarget,
        #[serde(default)]
        option_id: Option<String>,
    },
    /// Overwrites period `to` with a copy of period `from`.
    CopyPeriod { from: String, to: String },
    ReplaceAcrossPeriods { replacements: Vec<Replacement> },
    ChangeOptionType { option_id: String },
    /// Re-dates a monthly plan so its first day is today.
    ShiftPeriodsToToday,
    AddPeriod { date: NaiveDate },
    RemovePeriod { period: String },
    RenamePeriod { from: String, to: String },
    UpdateDetails { field: DetailField, value: String },
    SetSlotTiming { slot_id: String, timing: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotMetaMode {
    New,
    Edit,
    Delete,
}

/// Where in an option's content a dish is saved or deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DishTarget {
    /// The end of a flat dish list.
    #[default]
    Append,
    /// An element of a flat dish list.
    Index(usize),
    /// A node found by walking the content.
    Path(Path),
}

/// Copies one slot of `from_period` into `to_period`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub from_period: String,
    pub from_slot_index: usize,
    pub to_period: String,
    /// Destination slot id; the source slot's id when absent.
    #[serde(default)]
    pub to_slot_id: Option<String>,
}

impl Replacement {
    pub fn new(
        from_period: impl Into<String>,
        from_slot_index: usize,
        to_period: impl Into<String>,
    ) -> Self {
        Self {
            from_period: from_period.into(),
            from_slot_index,
            to_period: to_period.into(),
            to_slot_id: None,
        }
    }

    pub fn with_to_slot_id(mut self, slot_id: impl Into<String>) -> Self {
        self.to_slot_id = Some(slot_id.into());
        self
    }
}
