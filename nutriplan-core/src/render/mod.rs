//! Turns a canonical plan into printable section descriptors.

mod classify;
mod layout;

pub use classify::{CategoryRule, CategoryTable, DishCategory};
pub use layout::{
    DishCard, DishGroup, MacroSection, MacroSummary, PageBreak, PageSection, Pairing,
    ScheduleSection, SlotBlock, SlotCard,
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    period_label, sort_by_priority, DayEntry, Dish, NutrientTotals, Plan, PlanDetails, Slot,
    SlotKind,
};
use crate::nutrition::{day_totals, dish_nutrients, energy_split, slot_totals};

/// Which optional parts of a document are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub include_macros: bool,
    pub include_description: bool,
    pub include_guidelines: bool,
    pub include_supplements: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            include_macros: true,
            include_description: true,
            include_guidelines: true,
            include_supplements: true,
        }
    }
}

impl LayoutOptions {
    pub fn with_macros(mut self, include: bool) -> Self {
        self.include_macros = include;
        self
    }
}

/// Everything a printed plan is made from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    #[serde(default)]
    pub details: PlanDetails,
    #[serde(default)]
    pub plan: Plan,
    /// Dates the `day_N` periods when set.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub targets: BTreeMap<String, NutrientTotals>,
}

impl PlanDocument {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: PlanDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.start_date = start_date;
        self
    }

    pub fn with_targets(mut self, targets: BTreeMap<String, NutrientTotals>) -> Self {
        self.targets = targets;
        self
    }
}

/// Shortens the first `H:MM` or `HH.MM` clock time in `raw` to `H:MM`.
/// Text without a clock time is returned trimmed.
pub fn display_time(raw: &str) -> String {
    let text = raw.trim();
    let bytes = text.as_bytes();
    let digit = |i: usize| bytes.get(i).is_some_and(|b| b.is_ascii_digit());

    for (sep, &b) in bytes.iter().enumerate() {
        if (b != b':' && b != b'.') || sep == 0 || !digit(sep - 1) {
            continue;
        }
        if !digit(sep + 1) || !digit(sep + 2) {
            continue;
        }
        let start = if sep >= 2 && digit(sep - 2) { sep - 2 } else { sep - 1 };
        let hours: u32 = text[start..sep].parse().unwrap_or(0);
        return format!("{}:{}", hours, &text[sep + 1..sep + 3]);
    }
    text.to_string()
}

/// First dish time across all options, else the slot's default timing.
fn card_time(slot: &Slot) -> Option<String> {
    slot.options
        .iter()
        .flat_map(|option| option.dishes())
        .find_map(|dish| dish.time())
        .or_else(|| {
            slot.default_timing
                .clone()
                .filter(|timing| !timing.trim().is_empty())
        })
        .map(|time| display_time(&time))
}

fn dish_card(dish: &Dish, include_macros: bool) -> DishCard {
    DishCard {
        name: dish.name().unwrap_or_default(),
        description: dish.description(),
        serving_size: dish.serving_size(),
        time: dish.time().map(|time| display_time(&time)),
        image: dish.image(),
        macros: include_macros.then(|| MacroSummary::from(&dish_nutrients(dish))),
    }
}

fn dish_groups(slot: &Slot, options: &LayoutOptions, table: &CategoryTable) -> Vec<DishGroup> {
    let dishes: Vec<Dish> = slot.options.iter().flat_map(|option| option.dishes()).collect();
    let cards = |dishes: &[Dish]| -> Vec<DishCard> {
        dishes
            .iter()
            .map(|dish| dish_card(dish, options.include_macros))
            .collect()
    };

    if slot.kind().is_some_and(|kind| kind.is_combination()) {
        return table
            .group(&dishes)
            .into_iter()
            .map(|(category, dishes)| DishGroup {
                heading: Some(category.heading(dishes.len()).to_string()),
                category: Some(category),
                dishes: cards(&dishes),
            })
            .collect();
    }

    if dishes.is_empty() {
        return Vec::new();
    }
    let single_column = slot.kind().is_some_and(|kind| kind.is_single_column());
    let heading = (slot.options.len() > 1 && !single_column)
        .then(|| format!("Choose Any 1 of {} Options", slot.options.len()));
    vec![DishGroup {
        heading,
        category: None,
        dishes: cards(&dishes),
    }]
}

fn slot_card(slot: &Slot, options: &LayoutOptions, table: &CategoryTable) -> SlotCard {
    SlotCard {
        slot_id: slot.slot_id.clone(),
        label: slot.label(),
        time: card_time(slot),
        groups: dish_groups(slot, options, table),
        macros: options
            .include_macros
            .then(|| MacroSummary::from(&slot_totals(slot))),
    }
}

fn page_break(slot: &Slot) -> PageBreak {
    if slot.kind().is_some_and(|kind| kind.is_large()) {
        PageBreak::Flow
    } else {
        PageBreak::AvoidInside
    }
}

/// Cards for a day in serving order, with a wake-up card directly followed by
/// a before-breakfast card sharing one two-column block.
fn slot_blocks(day: &DayEntry, options: &LayoutOptions, table: &CategoryTable) -> Vec<SlotBlock> {
    let mut slots = day.slots.clone();
    sort_by_priority(&mut slots);

    let mut blocks = Vec::new();
    let mut iter = slots.iter().peekable();
    while let Some(slot) = iter.next() {
        let pairs_with_next = slot.kind() == Some(SlotKind::WakeUp)
            && iter
                .peek()
                .is_some_and(|next| next.kind() == Some(SlotKind::BeforeBreakfast));

        if pairs_with_next {
            let mut cards = vec![slot_card(slot, options, table)];
            cards.extend(iter.next().map(|next| slot_card(next, options, table)));
            blocks.push(SlotBlock {
                pairing: Pairing::TwoColumn,
                page_break: PageBreak::AvoidInside,
                slots: cards,
            });
        } else {
            blocks.push(SlotBlock {
                pairing: Pairing::FullWidth,
                page_break: page_break(slot),
                slots: vec![slot_card(slot, options, table)],
            });
        }
    }
    blocks
}

fn text_section(
    enabled: bool,
    text: &str,
    section: fn(String) -> PageSection,
) -> Option<PageSection> {
    let text = text.trim();
    (enabled && !text.is_empty()).then(|| section(text.to_string()))
}

/// Lays out `document` as an ordered list of sections: description,
/// guidelines and supplements, then per period an optional macro summary and
/// the meal schedule.
pub fn render(
    document: &PlanDocument,
    options: &LayoutOptions,
    table: &CategoryTable,
) -> Vec<PageSection> {
    let details = &document.details;
    let mut sections: Vec<PageSection> = [
        text_section(
            options.include_description,
            &details.description,
            PageSection::Description,
        ),
        text_section(
            options.include_guidelines,
            &details.guidelines,
            PageSection::Guidelines,
        ),
        text_section(
            options.include_supplements,
            &details.supplements,
            PageSection::Supplements,
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    for (period, day) in document.plan.iter() {
        let label = period_label(period, document.start_date);
        if options.include_macros {
            let totals = day_totals(day);
            sections.push(PageSection::Macros(MacroSection {
                period: period.to_string(),
                label: label.clone(),
                totals: MacroSummary::from(&totals),
                targets: document.targets.get(period).map(MacroSummary::from),
                split: energy_split(&totals),
            }));
        }
        sections.push(PageSection::Schedule(ScheduleSection {
            period: period.to_string(),
            label,
            blocks: slot_blocks(day, options, table),
        }));
    }

    tracing::debug!(
        periods = document.plan.len(),
        sections = sections.len(),
        "rendered plan document"
    );
    sections
}
