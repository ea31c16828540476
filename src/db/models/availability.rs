use serde::{Deserialize, Serialize};
use sqlx::types::Uuid;
use thiserror::Error;
use time::{Date, OffsetDateTime, Time};
use validator::Validate;

/// One bookable window on a provider's calendar. Uniqueness of
/// (provider, date, start, end) is enforced both here (filter-on-insert)
/// and by the table constraint.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub slot_date: Date,
    pub start_time: Time,
    pub end_time: Time,
    pub is_booked: bool,
    pub created_at: OffsetDateTime,
}

/// Grouped-by-date projection of a provider's slots. This is the read
/// shape the booking client consumes; a date entry disappears as soon as
/// its last slot is removed because there is no backing row left.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilitySlotSet {
    pub slot_date: Date,
    pub time_slots: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub start_time: Time,
    pub end_time: Time,
    pub is_available: bool,
    pub is_booked: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewSlotPayload {
    pub date: Date,
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveSlotPayload {
    pub date: Date,
    #[validate(length(min = 1, message = "Start time must not be empty"))]
    pub start: String,
    #[validate(length(min = 1, message = "End time must not be empty"))]
    pub end: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotTimeError {
    #[error("unparseable clock time: {0}")]
    Unparseable(String),

    #[error("slot start must be before slot end")]
    StartNotBeforeEnd,
}

/// A validated, normalized (start, end) pair within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotWindow {
    pub start: Time,
    pub end: Time,
}

impl SlotWindow {
    /// Normalizes 12-hour or 24-hour clock strings and requires
    /// `start < end` within the same day.
    pub fn parse(start: &str, end: &str) -> Result<Self, SlotTimeError> {
        let start = parse_clock_time(start)?;
        let end = parse_clock_time(end)?;
        if start >= end {
            return Err(SlotTimeError::StartNotBeforeEnd);
        }
        Ok(Self { start, end })
    }
}

/// Accepts "HH:MM" (24-hour) or "H:MM AM/PM" (12-hour, case-insensitive).
pub fn parse_clock_time(input: &str) -> Result<Time, SlotTimeError> {
    let raw = input.trim();
    let upper = raw.to_ascii_uppercase();

    let (clock, meridiem) = if let Some(rest) = upper.strip_suffix("AM") {
        (rest.trim_end().to_string(), Some(false))
    } else if let Some(rest) = upper.strip_suffix("PM") {
        (rest.trim_end().to_string(), Some(true))
    } else {
        (upper.clone(), None)
    };

    let mut parts = clock.split(':');
    let (hour_part, minute_part) = match (parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(m), None) => (h, m),
        _ => return Err(SlotTimeError::Unparseable(raw.to_string())),
    };

    let hour: u8 = hour_part
        .parse()
        .map_err(|_| SlotTimeError::Unparseable(raw.to_string()))?;
    let minute: u8 = minute_part
        .parse()
        .map_err(|_| SlotTimeError::Unparseable(raw.to_string()))?;

    let hour = match meridiem {
        Some(is_pm) => {
            if hour < 1 || hour > 12 {
                return Err(SlotTimeError::Unparseable(raw.to_string()));
            }
            match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, false) => h,
                (h, true) => h + 12,
            }
        }
        None => {
            if hour > 23 {
                return Err(SlotTimeError::Unparseable(raw.to_string()));
            }
            hour
        }
    };

    Time::from_hms(hour, minute, 0).map_err(|_| SlotTimeError::Unparseable(raw.to_string()))
}

/// Duration of a window in hours. An end earlier than the start is treated
/// as spanning midnight: `(end − start) mod 1440 / 60`.
pub fn duration_in_hours(start: Time, end: Time) -> f64 {
    let start_minutes = i64::from(start.hour()) * 60 + i64::from(start.minute());
    let end_minutes = i64::from(end.hour()) * 60 + i64::from(end.minute());
    let minutes = (end_minutes - start_minutes).rem_euclid(24 * 60);
    minutes as f64 / 60.0
}

/// Price of a window at an hourly rate.
pub fn price_for(rate_per_hour: f64, start: Time, end: Time) -> f64 {
    rate_per_hour * duration_in_hours(start, end)
}

/// True when the day already contains a slot with the identical
/// (start, end) pair. Callers treat that as a silent no-op, not an error.
pub fn is_duplicate(existing: &[AvailabilitySlot], window: SlotWindow) -> bool {
    existing
        .iter()
        .any(|slot| slot.start_time == window.start && slot.end_time == window.end)
}

/// Groups slot rows (already ordered by date, then start time) into the
/// per-date sets the read API returns.
pub fn group_by_date(rows: Vec<AvailabilitySlot>) -> Vec<AvailabilitySlotSet> {
    let mut sets: Vec<AvailabilitySlotSet> = Vec::new();
    for row in rows {
        let slot = TimeSlot {
            start_time: row.start_time,
            end_time: row.end_time,
            is_available: !row.is_booked,
            is_booked: row.is_booked,
        };
        match sets.last_mut() {
            Some(set) if set.slot_date == row.slot_date => set.time_slots.push(slot),
            _ => sets.push(AvailabilitySlotSet {
                slot_date: row.slot_date,
                time_slots: vec![slot],
            }),
        }
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, time};

    fn slot_row(slot_date: Date, start: Time, end: Time) -> AvailabilitySlot {
        AvailabilitySlot {
            id: Uuid::new_v4(),
            provider_id: Uuid::new_v4(),
            slot_date,
            start_time: start,
            end_time: end,
            is_booked: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn parses_24_hour_clock() {
        assert_eq!(parse_clock_time("09:00"), Ok(time!(09:00)));
        assert_eq!(parse_clock_time("23:45"), Ok(time!(23:45)));
        assert_eq!(parse_clock_time("0:05"), Ok(time!(00:05)));
    }

    #[test]
    fn parses_12_hour_clock() {
        assert_eq!(parse_clock_time("9:00 AM"), Ok(time!(09:00)));
        assert_eq!(parse_clock_time("2:30 pm"), Ok(time!(14:30)));
        assert_eq!(parse_clock_time("12:00 AM"), Ok(time!(00:00)));
        assert_eq!(parse_clock_time("12:00 PM"), Ok(time!(12:00)));
        assert_eq!(parse_clock_time("11:59PM"), Ok(time!(23:59)));
    }

    #[test]
    fn rejects_malformed_clock_strings() {
        for input in ["", "nine", "25:00", "10:75", "13:00 PM", "0:00 AM", "10", "10:00:00"] {
            assert!(
                parse_clock_time(input).is_err(),
                "expected {input:?} to be rejected"
            );
        }
    }

    #[test]
    fn window_requires_start_before_end() {
        assert_eq!(
            SlotWindow::parse("14:00", "14:00"),
            Err(SlotTimeError::StartNotBeforeEnd)
        );
        assert_eq!(
            SlotWindow::parse("18:00", "09:00"),
            Err(SlotTimeError::StartNotBeforeEnd)
        );
        let window = SlotWindow::parse("2:00 PM", "18:00").unwrap();
        assert_eq!(window.start, time!(14:00));
        assert_eq!(window.end, time!(18:00));
    }

    #[test]
    fn duration_of_a_same_day_window() {
        assert_eq!(duration_in_hours(time!(09:00), time!(12:00)), 3.0);
        assert_eq!(duration_in_hours(time!(10:00), time!(10:30)), 0.5);
    }

    #[test]
    fn duration_wraps_past_midnight() {
        assert_eq!(duration_in_hours(time!(22:00), time!(02:00)), 4.0);
        assert_eq!(duration_in_hours(time!(18:00), time!(09:00)), 15.0);
    }

    #[test]
    fn price_is_rate_times_hours() {
        assert_eq!(price_for(150.0, time!(14:00), time!(18:00)), 600.0);
        assert_eq!(price_for(80.0, time!(09:00), time!(09:30)), 40.0);
    }

    #[test]
    fn duplicate_detection_matches_on_exact_window() {
        let day = date!(2025 - 09 - 10);
        let existing = vec![slot_row(day, time!(14:00), time!(18:00))];
        assert!(is_duplicate(
            &existing,
            SlotWindow::parse("14:00", "18:00").unwrap()
        ));
        assert!(!is_duplicate(
            &existing,
            SlotWindow::parse("14:00", "17:00").unwrap()
        ));
    }

    #[test]
    fn grouping_buckets_rows_by_date() {
        let first = date!(2025 - 09 - 10);
        let second = date!(2025 - 09 - 11);
        let rows = vec![
            slot_row(first, time!(09:00), time!(12:00)),
            slot_row(first, time!(14:00), time!(18:00)),
            slot_row(second, time!(10:00), time!(11:00)),
        ];
        let sets = group_by_date(rows);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].slot_date, first);
        assert_eq!(sets[0].time_slots.len(), 2);
        assert_eq!(sets[1].slot_date, second);
        assert_eq!(sets[1].time_slots.len(), 1);
    }
}
