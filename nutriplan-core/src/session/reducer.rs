use chrono::{Duration, Local, NaiveDate};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use super::intent::{DishTarget, Intent, Replacement, SlotMetaMode};
use super::{ReplaceReport, SessionState, SkipReason, SkippedReplacement};
use crate::models::{
    format_date_key, parse_date_key, DayEntry, PeriodMode, Plan, Slot, DEFAULT_OPTION_ID,
};
use crate::normalize::normalize_dish_payload;
use crate::path::{self, Path};

/// Applies `intent` to `state` and returns the next state.
pub fn apply(state: &SessionState, intent: &Intent) -> SessionState {
    apply_at(state, intent, Local::now().date_naive())
}

/// [`apply`] with an explicit current date for the date-dependent intents.
pub fn apply_at(state: &SessionState, intent: &Intent, today: NaiveDate) -> SessionState {
    let mut next = state.clone();

    match intent {
        Intent::SelectPeriodMode { mode } => {
            let details = next.details;
            next = SessionState::new(*mode, today).with_details(details);
        }
        Intent::SelectPeriod { period } => {
            if next.plan.contains(period) {
                next.select_period(period);
            } else {
                debug!(period = %period, "select period: no such period");
            }
        }
        Intent::SelectSlot { slot_id } => {
            if next.current_day().is_some_and(|day| day.contains(slot_id)) {
                next.selected_slot = slot_id.clone();
                next.selected_option = DEFAULT_OPTION_ID.to_string();
            } else {
                debug!(slot_id = %slot_id, "select slot: no such slot");
            }
        }
        Intent::SaveSlotMeta {
            slot_id,
            mode,
            index,
        } => save_slot_meta(&mut next, slot_id, *mode, *index),
        Intent::ReorderSlots {
            old_index,
            new_index,
        } => {
            if let Some(day) = next.current_day_mut() {
                let len = day.slots.len();
                if old_index != new_index && *old_index < len && *new_index < len {
                    let slot = day.slots.remove(*old_index);
                    day.slots.insert(*new_index, slot);
                }
            }
        }
        Intent::SaveDish {
            target,
            payload,
            is_new,
            option_id,
        } => save_dish(&mut next, target, payload, *is_new, option_id.as_deref()),
        Intent::DeleteDish { target, option_id } => {
            delete_dish(&mut next, target, option_id.as_deref())
        }
        Intent::CopyPeriod { from, to } => match state.plan.get(from) {
            Some(day) => {
                next.plan.insert(to.clone(), day.clone());
                next.plan.sort_periods();
            }
            None => debug!(from = %from, "copy period: no such period"),
        },
        Intent::ReplaceAcrossPeriods { replacements } => {
            if !replacements.is_empty() {
                let report = replace_across_periods(&state.plan, &mut next.plan, replacements);
                if report.all_skipped() {
                    warn!(skipped = report.skipped.len(), "no replacement could be applied");
                }
                next.last_replace = Some(report);
            }
        }
        Intent::ChangeOptionType { option_id } => {
            next.selected_option = option_id.clone();
        }
        Intent::ShiftPeriodsToToday => {
            if next.mode == PeriodMode::Monthly {
                next.plan = shift_to(&state.plan, today);
                next.select_period(&format_date_key(today));
            } else {
                debug!(mode = %next.mode, "shift to today only applies to monthly plans");
            }
        }
        Intent::AddPeriod { date } => add_period(&mut next, *date),
        Intent::RemovePeriod { period } => {
            if next.plan.remove(period).is_some() && next.selected_period == *period {
                next.select_first_period();
            }
        }
        Intent::RenamePeriod { from, to } => {
            if next.plan.rename(from, to) {
                next.plan.sort_periods();
                let slot = next.selected_slot.clone();
                next.select_period(to);
                if next.current_day().is_some_and(|day| day.contains(&slot)) {
                    next.selected_slot = slot;
                }
            } else {
                debug!(from = %from, to = %to, "rename period refused");
            }
        }
        Intent::UpdateDetails { field, value } => {
            next.details.set(*field, value.clone());
        }
        Intent::SetSlotTiming { slot_id, timing } => {
            if let Some(slot) = next.current_day_mut().and_then(|day| day.slot_mut(slot_id)) {
                let timing = timing.trim();
                slot.default_timing = (!timing.is_empty()).then(|| timing.to_string());
            }
        }
    }

    next
}

fn save_slot_meta(state: &mut SessionState, slot_id: &str, mode: SlotMetaMode, index: Option<usize>) {
    let slot_id = slot_id.trim();
    let Some(day) = state.current_day_mut() else {
        return;
    };

    match mode {
        SlotMetaMode::New => {
            if slot_id.is_empty() || day.contains(slot_id) {
                debug!(slot_id = %slot_id, "new slot rejected");
                return;
            }
            day.slots.push(Slot::new(slot_id));
            state.selected_slot = slot_id.to_string();
        }
        SlotMetaMode::Edit => {
            let Some(index) = index.filter(|i| *i < day.slots.len()) else {
                return;
            };
            let taken = day
                .position(slot_id)
                .is_some_and(|position| position != index);
            if slot_id.is_empty() || taken {
                debug!(slot_id = %slot_id, "slot rename rejected");
                return;
            }
            day.slots[index].slot_id = slot_id.to_string();
            state.selected_slot = slot_id.to_string();
        }
        SlotMetaMode::Delete => {
            let Some(index) = index.filter(|i| *i < day.slots.len()) else {
                return;
            };
            day.slots.remove(index);
            let last = day
                .slots
                .last()
                .map(|slot| slot.slot_id.clone())
                .unwrap_or_default();
            state.selected_slot = last;
        }
    }
}

fn selected_option_id(state: &SessionState, option_id: Option<&str>) -> String {
    option_id
        .filter(|id| !id.is_empty())
        .or(Some(state.selected_option.as_str()).filter(|id| !id.is_empty()))
        .unwrap_or(DEFAULT_OPTION_ID)
        .to_string()
}

fn save_dish(
    state: &mut SessionState,
    target: &DishTarget,
    payload: &Value,
    is_new: bool,
    option_id: Option<&str>,
) {
    let option_id = selected_option_id(state, option_id);
    let slot_id = state.selected_slot.clone();
    let Some(slot) = state
        .current_day_mut()
        .and_then(|day| day.slot_mut(&slot_id))
    else {
        debug!(slot_id = %slot_id, "save dish: no selected slot");
        return;
    };

    let dish = normalize_dish_payload(payload, slot.fallback_time().as_deref());
    let option = slot.ensure_option(&option_id);

    option.content = match target {
        DishTarget::Path(dish_path) => path::append_at(&option.content, dish_path, dish),
        DishTarget::Index(index) if !is_new => {
            path::append_at(&option.content, &Path::root().child(*index), dish)
        }
        _ => match &option.content {
            Value::Array(_) => path::append_at(&option.content, &Path::root(), dish),
            _ => {
                debug!("save dish: content is not a list, pass a path to add into it");
                option.content.clone()
            }
        },
    };
}

fn delete_dish(state: &mut SessionState, target: &DishTarget, option_id: Option<&str>) {
    let option_id = selected_option_id(state, option_id);
    let slot_id = state.selected_slot.clone();
    let Some(option) = state
        .current_day_mut()
        .and_then(|day| day.slot_mut(&slot_id))
        .and_then(|slot| slot.option_mut(&option_id))
    else {
        return;
    };

    match target {
        DishTarget::Index(index) => {
            option.content = path::delete(&option.content, &Path::root().child(*index));
        }
        DishTarget::Path(dish_path) => {
            option.content = path::delete(&option.content, dish_path);
        }
        DishTarget::Append => debug!("delete dish: no target"),
    }
}

/// Copies source slots out of `source` into `destination` entry by entry.
fn replace_across_periods(
    source: &Plan,
    destination: &mut Plan,
    replacements: &[Replacement],
) -> ReplaceReport {
    let mut report = ReplaceReport::default();

    for (index, replacement) in replacements.iter().enumerate() {
        let resolved = source
            .get(&replacement.from_period)
            .ok_or(SkipReason::MissingSourcePeriod)
            .and_then(|day| {
                day.slots
                    .get(replacement.from_slot_index)
                    .ok_or(SkipReason::MissingSourceSlot)
            })
            .and_then(|slot| {
                replacement
                    .to_slot_id
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .or(Some(slot.slot_id.as_str()).filter(|id| !id.is_empty()))
                    .map(|id| (slot, id.to_string()))
                    .ok_or(SkipReason::MissingSlotId)
            });

        let (source_slot, slot_id) = match resolved {
            Ok(found) => found,
            Err(reason) => {
                debug!(index, %reason, "replacement skipped");
                report.skipped.push(SkippedReplacement { index, reason });
                continue;
            }
        };

        if !destination.contains(&replacement.to_period) {
            destination.insert(replacement.to_period.clone(), DayEntry::default());
            destination.sort_periods();
        }
        if let Some(day) = destination.get_mut(&replacement.to_period) {
            match day.slot_mut(&slot_id) {
                Some(slot) => slot.options = source_slot.options.clone(),
                None => day.slots.push(Slot {
                    slot_id,
                    options: source_slot.options.clone(),
                    default_timing: source_slot.default_timing.clone(),
                }),
            }
            report.applied += 1;
        }
    }

    report
}

/// Re-keys the dated periods of `plan` onto consecutive days from `today`,
/// keeping their order. Other periods are kept as they are.
fn shift_to(plan: &Plan, today: NaiveDate) -> Plan {
    let mut dated: Vec<(NaiveDate, &DayEntry)> = plan
        .iter()
        .filter_map(|(key, day)| parse_date_key(key).map(|date| (date, day)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);

    let mut shifted = Plan::new();
    for (offset, (_, day)) in dated.into_iter().enumerate() {
        let date = today + Duration::days(offset as i64);
        shifted.insert(format_date_key(date), day.clone());
    }
    for (key, day) in plan.iter() {
        if parse_date_key(key).is_none() {
            shifted.insert(key, day.clone());
        }
    }
    shifted.sort_periods();
    shifted
}

fn add_period(state: &mut SessionState, date: NaiveDate) {
    let key = format_date_key(date);
    if !state.plan.contains(&key) {
        let mut timings: HashMap<&str, &str> = HashMap::new();
        for (_, day) in state.plan.iter() {
            for slot in &day.slots {
                if let Some(timing) = slot.default_timing.as_deref().filter(|t| !t.is_empty()) {
                    timings.entry(slot.slot_id.as_str()).or_insert(timing);
                }
            }
        }

        let mut day = DayEntry::template();
        for slot in day.slots.iter_mut() {
            if let Some(timing) = timings.get(slot.slot_id.as_str()) {
                slot.default_timing = Some(timing.to_string());
            }
        }
        state.plan.insert(key.clone(), day);
        state.plan.sort_periods();
    }
    state.select_period(&key);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailField, MealOption};
    use crate::path::PathSegment;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn daily_with(slots: Vec<Slot>) -> SessionState {
        let mut state = SessionState::new(PeriodMode::Daily, today());
        state.plan = Plan::single("daily", DayEntry::new(slots));
        state.select_period("daily");
        state
    }

    fn slot_ids(state: &SessionState) -> Vec<String> {
        state
            .current_day()
            .unwrap()
            .slots
            .iter()
            .map(|s| s.slot_id.clone())
            .collect()
    }

    fn assert_unique_slots(state: &SessionState) {
        for (_, day) in state.plan.iter() {
            let mut ids: Vec<&str> = day.slots.iter().map(|s| s.slot_id.as_str()).collect();
            let before = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), before);
        }
    }

    #[test]
    fn test_apply_does_not_touch_input() {
        let state = SessionState::new(PeriodMode::Daily, today());
        let next = apply_at(
            &state,
            &Intent::UpdateDetails {
                field: DetailField::Title,
                value: "Cut".to_string(),
            },
            today(),
        );
        assert_eq!(next.details.title, "Cut");
        assert!(state.details.title.is_empty());
    }

    #[test]
    fn test_select_period_mode_reseeds() {
        let state = SessionState::new(PeriodMode::Daily, today());
        let next = apply_at(
            &state,
            &Intent::SelectPeriodMode {
                mode: PeriodMode::Monthly,
            },
            today(),
        );
        assert_eq!(next.mode, PeriodMode::Monthly);
        assert_eq!(next.plan.keys().collect::<Vec<_>>(), vec!["18-10-2026"]);
        assert_eq!(next.selected_period, "18-10-2026");
        assert_eq!(next.selected_slot, "when_you_wake_up");
    }

    #[test]
    fn test_select_slot_resets_option() {
        let mut state = SessionState::new(PeriodMode::Daily, today());
        state.selected_option = "option_3".to_string();
        let next = apply_at(
            &state,
            &Intent::SelectSlot {
                slot_id: "lunch".to_string(),
            },
            today(),
        );
        assert_eq!(next.selected_slot, "lunch");
        assert_eq!(next.selected_option, "option_1");

        let missing = apply_at(
            &next,
            &Intent::SelectSlot {
                slot_id: "brunch".to_string(),
            },
            today(),
        );
        assert_eq!(missing.selected_slot, "lunch");
    }

    #[test]
    fn test_reorder_slots() {
        let state = daily_with(vec![Slot::new("a"), Slot::new("b"), Slot::new("c")]);
        let next = apply_at(
            &state,
            &Intent::ReorderSlots {
                old_index: 0,
                new_index: 2,
            },
            today(),
        );
        assert_eq!(slot_ids(&next), vec!["b", "c", "a"]);

        let same = apply_at(
            &state,
            &Intent::ReorderSlots {
                old_index: 1,
                new_index: 1,
            },
            today(),
        );
        assert_eq!(same, state);

        let out_of_range = apply_at(
            &state,
            &Intent::ReorderSlots {
                old_index: 0,
                new_index: 9,
            },
            today(),
        );
        assert_eq!(out_of_range, state);
    }

    #[test]
    fn test_save_slot_meta_keeps_ids_unique() {
        let state = daily_with(vec![Slot::new("breakfast"), Slot::new("lunch")]);
        let intents = vec![
            Intent::SaveSlotMeta {
                slot_id: "lunch".to_string(),
                mode: SlotMetaMode::New,
                index: None,
            },
            Intent::SaveSlotMeta {
                slot_id: "breakfast".to_string(),
                mode: SlotMetaMode::Edit,
                index: Some(1),
            },
            Intent::SaveSlotMeta {
                slot_id: "dinner".to_string(),
                mode: SlotMetaMode::New,
                index: None,
            },
            Intent::SaveSlotMeta {
                slot_id: "brunch".to_string(),
                mode: SlotMetaMode::Edit,
                index: Some(0),
            },
        ];
        let next = intents
            .iter()
            .fold(state, |acc, intent| apply_at(&acc, intent, today()));
        assert_eq!(slot_ids(&next), vec!["brunch", "lunch", "dinner"]);
        assert_eq!(next.selected_slot, "brunch");
        assert_unique_slots(&next);
    }

    #[test]
    fn test_save_slot_meta_delete_selects_last() {
        let state = daily_with(vec![Slot::new("a"), Slot::new("b"), Slot::new("c")]);
        let next = apply_at(
            &state,
            &Intent::SaveSlotMeta {
                slot_id: String::new(),
                mode: SlotMetaMode::Delete,
                index: Some(2),
            },
            today(),
        );
        assert_eq!(slot_ids(&next), vec!["a", "b"]);
        assert_eq!(next.selected_slot, "b");
    }

    #[test]
    fn test_save_new_dish_into_empty_slot() {
        let mut state = daily_with(vec![Slot::new("breakfast").with_default_timing("08:00")]);
        state.selected_slot = "breakfast".to_string();
        let next = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Append,
                payload: json!({"dish_name": "Oats"}),
                is_new: true,
                option_id: Some("option_1".to_string()),
            },
            today(),
        );
        let slot = next.current_slot().unwrap();
        let dishes = slot.options[0].dishes();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].name(), Some("Oats".to_string()));
        assert_eq!(dishes[0].time(), Some("08:00".to_string()));
    }

    #[test]
    fn test_save_dish_time_falls_back_to_first_dish() {
        let slot = Slot::new("breakfast").with_options(vec![
            MealOption::new("option_1").with_content(json!([{"name": "Tea", "time": "07:00"}]))
        ]);
        let state = daily_with(vec![slot]);
        let next = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Append,
                payload: json!({"name": "Toast"}),
                is_new: true,
                option_id: None,
            },
            today(),
        );
        let dishes = next.current_slot().unwrap().options[0].dishes();
        assert_eq!(dishes[1].time(), Some("07:00".to_string()));
    }

    #[test]
    fn test_save_dish_creates_missing_option() {
        let state = daily_with(vec![Slot::new("dinner")]);
        let next = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Append,
                payload: json!({"name": "Khichdi"}),
                is_new: true,
                option_id: Some("option_2".to_string()),
            },
            today(),
        );
        let slot = next.current_slot().unwrap();
        assert_eq!(slot.options.len(), 2);
        assert_eq!(slot.option("option_2").unwrap().dishes().len(), 1);
    }

    #[test]
    fn test_save_dish_patches_by_index() {
        let slot = Slot::new("lunch").with_options(vec![MealOption::new("option_1")
            .with_content(json!([{"name": "Dal", "calories": 100}, {"name": "Rice"}]))]);
        let state = daily_with(vec![slot]);
        let next = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Index(0),
                payload: json!({"name": "Dal Tadka", "calories": 150}),
                is_new: false,
                option_id: None,
            },
            today(),
        );
        let content = &next.current_slot().unwrap().options[0].content;
        assert_eq!(content[0]["name"], json!("Dal Tadka"));
        assert_eq!(content[0]["calories"], json!(150));
        assert_eq!(content.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_save_dish_into_composite_by_path() {
        let slot = Slot::new("lunch").with_options(vec![MealOption::new("option_1")
            .with_content(json!({"roti": {"items": [{"name": "Phulka"}]}}))]);
        let state = daily_with(vec![slot]);
        let items: Path = vec![PathSegment::from("roti"), PathSegment::from("items")]
            .into_iter()
            .collect();
        let next = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Path(items),
                payload: json!({"name": "Jowar Roti"}),
                is_new: true,
                option_id: None,
            },
            today(),
        );
        let content = &next.current_slot().unwrap().options[0].content;
        assert_eq!(content["roti"]["items"][1]["name"], json!("Jowar Roti"));

        let appended_to_root = apply_at(
            &state,
            &Intent::SaveDish {
                target: DishTarget::Append,
                payload: json!({"name": "Stray"}),
                is_new: true,
                option_id: None,
            },
            today(),
        );
        assert_eq!(appended_to_root, state);
    }

    #[test]
    fn test_delete_dish_by_index_and_path() {
        let slot = Slot::new("lunch").with_options(vec![MealOption::new("option_1").with_content(
            json!({"roti": {"items": [{"name": "Phulka"}, {"name": "Rice"}]}, "dal": {"name": "Dal"}}),
        )]);
        let state = daily_with(vec![slot]);
        let path: Path = vec![
            PathSegment::from("roti"),
            PathSegment::from("items"),
            PathSegment::from(0),
        ]
        .into_iter()
        .collect();
        let next = apply_at(
            &state,
            &Intent::DeleteDish {
                target: DishTarget::Path(path),
                option_id: None,
            },
            today(),
        );
        let content = &next.current_slot().unwrap().options[0].content;
        assert_eq!(content["roti"]["items"], json!([{"name": "Rice"}]));

        let flat = daily_with(vec![Slot::new("x").with_options(vec![
            MealOption::new("option_1").with_content(json!([{"name": "A"}, {"name": "B"}]))
        ])]);
        let next = apply_at(
            &flat,
            &Intent::DeleteDish {
                target: DishTarget::Index(0),
                option_id: Some("option_1".to_string()),
            },
            today(),
        );
        assert_eq!(
            next.current_slot().unwrap().options[0].content,
            json!([{"name": "B"}])
        );
    }

    #[test]
    fn test_copy_period_is_independent() {
        let state = SessionState::new(PeriodMode::Weekly, today());
        let mut next = apply_at(
            &state,
            &Intent::CopyPeriod {
                from: "sun".to_string(),
                to: "mon".to_string(),
            },
            today(),
        );
        next.plan.get_mut("sun").unwrap().slots.clear();
        assert_eq!(next.plan.get("mon").unwrap().slots.len(), 10);
    }

    #[test]
    fn test_replace_across_periods() {
        let mut state = SessionState::new(PeriodMode::Weekly, today());
        state.plan.get_mut("sun").unwrap().slots[2].options[0].content = json!([{"name": "Idli"}]);

        let next = apply_at(
            &state,
            &Intent::ReplaceAcrossPeriods {
                replacements: vec![
                    Replacement::new("sun", 2, "mon"),
                    Replacement::new("sun", 2, "tue").with_to_slot_id("brunch"),
                    Replacement::new("sun", 42, "wed"),
                    Replacement::new("holiday", 0, "wed"),
                ],
            },
            today(),
        );

        let mon = next.plan.get("mon").unwrap();
        assert_eq!(mon.slot("breakfast").unwrap().options[0].dishes().len(), 1);
        let tue = next.plan.get("tue").unwrap();
        assert_eq!(tue.slots.last().unwrap().slot_id, "brunch");

        let report = next.last_replace.as_ref().unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(
            report.skipped,
            vec![
                SkippedReplacement {
                    index: 2,
                    reason: SkipReason::MissingSourceSlot
                },
                SkippedReplacement {
                    index: 3,
                    reason: SkipReason::MissingSourcePeriod
                },
            ]
        );
        assert_unique_slots(&next);
    }

    #[test]
    fn test_replace_all_skipped_and_empty() {
        let state = SessionState::new(PeriodMode::Daily, today());
        let next = apply_at(
            &state,
            &Intent::ReplaceAcrossPeriods {
                replacements: vec![Replacement::new("nowhere", 0, "daily")],
            },
            today(),
        );
        assert!(next.last_replace.as_ref().unwrap().all_skipped());
        assert_eq!(next.plan, state.plan);

        let empty = apply_at(
            &state,
            &Intent::ReplaceAcrossPeriods {
                replacements: Vec::new(),
            },
            today(),
        );
        assert_eq!(empty, state);
    }

    #[test]
    fn test_replace_creates_destination_period() {
        let state = SessionState::new(PeriodMode::Monthly, today());
        let next = apply_at(
            &state,
            &Intent::ReplaceAcrossPeriods {
                replacements: vec![Replacement::new("18-10-2026", 0, "19-10-2026")],
            },
            today(),
        );
        assert_eq!(next.plan.get("19-10-2026").unwrap().slots.len(), 1);
    }

    #[test]
    fn test_shift_periods_to_today() {
        let mut state = SessionState::new(PeriodMode::Monthly, today());
        state.plan = Plan::seeded(&["05-01-2026", "03-01-2026"]);
        state.plan.get_mut("05-01-2026").unwrap().slots.truncate(1);

        let next = apply_at(&state, &Intent::ShiftPeriodsToToday, today());
        assert_eq!(
            next.plan.keys().collect::<Vec<_>>(),
            vec!["18-10-2026", "19-10-2026"]
        );
        assert_eq!(next.plan.get("19-10-2026").unwrap().slots.len(), 1);
        assert_eq!(next.selected_period, "18-10-2026");

        let weekly = SessionState::new(PeriodMode::Weekly, today());
        assert_eq!(apply_at(&weekly, &Intent::ShiftPeriodsToToday, today()), weekly);
    }

    #[test]
    fn test_add_period_inherits_timings() {
        let mut state = SessionState::new(PeriodMode::Monthly, today());
        state
            .plan
            .get_mut("18-10-2026")
            .unwrap()
            .slot_mut("breakfast")
            .unwrap()
            .default_timing = Some("08:30".to_string());

        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let next = apply_at(&state, &Intent::AddPeriod { date }, today());
        assert_eq!(
            next.plan.keys().collect::<Vec<_>>(),
            vec!["17-10-2026", "18-10-2026"]
        );
        assert_eq!(next.selected_period, "17-10-2026");
        let added = next.plan.get("17-10-2026").unwrap();
        assert_eq!(
            added.slot("breakfast").unwrap().default_timing.as_deref(),
            Some("08:30")
        );
        assert_eq!(added.slot("lunch").unwrap().default_timing, None);

        let again = apply_at(&next, &Intent::AddPeriod { date }, today());
        assert_eq!(again.plan, next.plan);
    }

    #[test]
    fn test_remove_and_rename_period() {
        let state = SessionState::new(PeriodMode::Weekly, today());
        let removed = apply_at(
            &state,
            &Intent::RemovePeriod {
                period: "sun".to_string(),
            },
            today(),
        );
        assert_eq!(removed.plan.len(), 6);
        assert_eq!(removed.selected_period, "mon");

        let clash = apply_at(
            &removed,
            &Intent::RenamePeriod {
                from: "mon".to_string(),
                to: "tue".to_string(),
            },
            today(),
        );
        assert_eq!(clash, removed);

        let renamed = apply_at(
            &removed,
            &Intent::RenamePeriod {
                from: "mon".to_string(),
                to: "sun".to_string(),
            },
            today(),
        );
        assert_eq!(renamed.plan.first_key(), Some("sun"));
        assert_eq!(renamed.selected_period, "sun");
    }

    #[test]
    fn test_set_slot_timing_and_change_option() {
        let state = SessionState::new(PeriodMode::Daily, today());
        let next = apply_at(
            &state,
            &Intent::SetSlotTiming {
                slot_id: "dinner".to_string(),
                timing: "20:00".to_string(),
            },
            today(),
        );
        let dinner = next.current_day().unwrap().slot("dinner").unwrap();
        assert_eq!(dinner.default_timing.as_deref(), Some("20:00"));

        let next = apply_at(
            &next,
            &Intent::ChangeOptionType {
                option_id: "option_2".to_string(),
            },
            today(),
        );
        assert_eq!(next.selected_option, "option_2");
    }
}
