//! C1 — Calendar: expand `[start,end]` into an ordered day list, classify
//! weekday/weekend, enumerate Saturday→Sunday weekend-pair indices.

use crate::error::{EngineError, EngineResult};
use chrono::{Datelike, Duration, NaiveDate};

/// One day in the roster horizon.
#[derive(Debug, Clone, Copy)]
pub struct Day {
    pub date: NaiveDate,
    /// chrono weekday number, 0=Mon..6=Sun (matches spec's clinic_days convention).
    pub weekday: u8,
}

impl Day {
    pub fn is_weekend(&self) -> bool {
        self.weekday >= 5
    }
}

/// A Sat→Sun adjacent pair, indexed into `Calendar.days`.
#[derive(Debug, Clone, Copy)]
pub struct WeekendPair {
    pub sat: usize,
    pub sun: usize,
}

pub struct Calendar {
    pub days: Vec<Day>,
    pub weekend_pairs: Vec<WeekendPair>,
}

impl Calendar {
    /// Expands the inclusive `[start, end]` range into a day list.
    pub fn build(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::InputError(format!(
                "roster_start {start} is after roster_end {end}"
            )));
        }

        let mut days = Vec::new();
        let mut current = start;
        while current <= end {
            days.push(Day {
                date: current,
                weekday: current.weekday().num_days_from_monday() as u8,
            });
            current += Duration::days(1);
        }

        let mut weekend_pairs = Vec::new();
        for s in 0..days.len().saturating_sub(1) {
            if days[s].weekday == 5 && days[s + 1].weekday == 6 {
                weekend_pairs.push(WeekendPair { sat: s, sun: s + 1 });
            }
        }

        Ok(Self { days, weekend_pairs })
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Full months between two dates, per spec §4.1.
pub fn months_between(a: NaiveDate, b: NaiveDate) -> i32 {
    12 * (b.year() - a.year()) + (b.month() as i32 - a.month() as i32)
}
