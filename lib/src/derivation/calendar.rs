// lib/src/derivation/calendar.rs

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use models::errors::{ValidationError, ValidationResult};
use models::Incident;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// A displayed month of the appointment calendar (proleptic Gregorian).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CalendarMonth {
    year: i32,
    month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> ValidationResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|_| CalendarMonth { year, month })
            .ok_or(ValidationError::InvalidMonth { year, month })
    }

    /// The month `date` falls in.
    pub fn containing(date: NaiveDate) -> Self {
        CalendarMonth { year: date.year(), month: date.month() }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    fn first_day(&self) -> NaiveDate {
        // `new` and `containing` only build months chrono can represent.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn previous(&self) -> Self {
        if self.month == 1 {
            CalendarMonth { year: self.year - 1, month: 12 }
        } else {
            CalendarMonth { year: self.year, month: self.month - 1 }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            CalendarMonth { year: self.year + 1, month: 1 }
        } else {
            CalendarMonth { year: self.year, month: self.month + 1 }
        }
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        match NaiveDate::from_ymd_opt(next.year, next.month, 1) {
            Some(next_first) => next_first.signed_duration_since(self.first_day()).num_days() as u32,
            // Only reachable for December of chrono's last representable year.
            None => 31,
        }
    }

    /// Blank cells before day 1 in a Sunday-first week grid.
    pub fn first_weekday_offset(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        if day == 0 || day > self.days_in_month() {
            return None;
        }
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    /// Grid cells: `None` for the leading blanks, then each day number.
    pub fn cells(&self) -> Vec<Option<u32>> {
        let offset = self.first_weekday_offset() as usize;
        let mut cells = vec![None; offset];
        cells.extend((1..=self.days_in_month()).map(Some));
        cells
    }

    /// Incidents whose appointment falls on `day` of this month, by local calendar date.
    pub fn appointments_on<'a>(&self, incidents: &'a [Incident], day: u32) -> Vec<&'a Incident> {
        match self.date_of(day) {
            Some(date) => incidents.iter().filter(|i| i.appointment_day() == date).collect(),
            None => Vec::new(),
        }
    }

    /// Every day of the month mapped to its incidents, in stored order.
    pub fn buckets<'a>(&self, incidents: &'a [Incident]) -> BTreeMap<u32, Vec<&'a Incident>> {
        let mut buckets: BTreeMap<u32, Vec<&'a Incident>> =
            (1..=self.days_in_month()).map(|day| (day, Vec::new())).collect();
        for incident in incidents {
            let date = incident.appointment_day();
            if date.year() == self.year && date.month() == self.month {
                if let Some(bucket) = buckets.get_mut(&date.day()) {
                    bucket.push(incident);
                }
            }
        }
        buckets
    }

    pub fn is_today(&self, day: u32, today: NaiveDate) -> bool {
        self.date_of(day) == Some(today)
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.year)
    }
}
