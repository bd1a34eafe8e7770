// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Absolute send time from a trigger instant and a relative delay.
//!
//! Minutes and hours are fixed durations. Days are calendar days in the
//! configured zone, so month lengths and DST transitions apply.

use chrono::{DateTime, Days, Local, MappedLocalTime, Offset, TimeDelta, TimeZone, Utc};
use leadflow_core::{Delay, DelayUnit, LeadflowError, ScheduleZone, latest_send_time};

/// Compute `now + delay`.
///
/// Fails with [`LeadflowError::Schedule`] when the result is later than
/// [`latest_send_time`] or leaves chrono's representable range.
pub fn scheduled_for(
    now: DateTime<Utc>,
    delay: Delay,
    zone: ScheduleZone,
) -> Result<DateTime<Utc>, LeadflowError> {
    let amount = i64::from(delay.value);
    let result = match delay.unit {
        DelayUnit::Minutes => TimeDelta::try_minutes(amount).and_then(|d| now.checked_add_signed(d)),
        DelayUnit::Hours => TimeDelta::try_hours(amount).and_then(|d| now.checked_add_signed(d)),
        DelayUnit::Days => match zone {
            ScheduleZone::Utc => add_calendar_days(now, delay.value),
            ScheduleZone::Local => add_calendar_days(now.with_timezone(&Local), delay.value)
                .map(|t| t.with_timezone(&Utc)),
        },
    };
    result
        .filter(|at| *at <= latest_send_time())
        .ok_or_else(|| {
            LeadflowError::Schedule(format!(
                "cannot add {delay} to {} in {zone} time",
                now.to_rfc3339()
            ))
        })
}

/// Add calendar days keeping the wall-clock time of `start`.
///
/// A wall time repeated by a backward transition resolves to its earlier
/// instant. A wall time skipped by a forward transition moves forward by the
/// length of the gap.
fn add_calendar_days<Tz: TimeZone>(start: DateTime<Tz>, days: u32) -> Option<DateTime<Tz>> {
    if days == 0 {
        return Some(start);
    }
    let tz = start.timezone();
    let target = start.naive_local().checked_add_days(Days::new(u64::from(days)))?;
    match tz.from_local_datetime(&target) {
        MappedLocalTime::Single(at) => Some(at),
        MappedLocalTime::Ambiguous(earliest, _) => Some(earliest),
        MappedLocalTime::None => {
            // Read the wall time with the offset in force a day earlier.
            let before = tz
                .from_local_datetime(&target.checked_sub_days(Days::new(1))?)
                .earliest()?;
            let offset_secs = i64::from(before.offset().fix().local_minus_utc());
            let utc = target.checked_sub_signed(TimeDelta::try_seconds(offset_secs)?)?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}
