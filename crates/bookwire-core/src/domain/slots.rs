use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::util::days_in_year_month;
use time::{Date, Month, PrimitiveDateTime};

use super::models::Provider;

/// Calendar-date format used by the upstream query parameters and the
/// date-discovery response.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Timestamp format used by the upstream per-day slot listings.
pub const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .expect("calendar dates always format")
}

pub fn format_datetime(at: PrimitiveDateTime) -> String {
    at.format(DATETIME_FORMAT)
        .expect("slot datetimes always format")
}

pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    Date::parse(raw, DATE_FORMAT)
}

pub fn parse_datetime(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(raw, DATETIME_FORMAT)
}

/// Adds one calendar month, clamping the day to the target month's length.
pub fn plus_one_month(date: Date) -> Date {
    let (year, month) = match date.month() {
        Month::December => (date.year() + 1, Month::January),
        month => (date.year(), month.next()),
    };
    let day = date.day().min(days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).expect("clamped day fits the target month")
}

/// Chronologically ordered index of bookable points in time.
///
/// Each timestamp maps to the providers available at that moment; a provider
/// listed in the upstream times mapping but missing from the roster appears
/// as `None` rather than aborting the merge. JSON serialization renders keys
/// in the upstream's `yyyy-MM-dd HH:mm:ss` format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotIndex {
    slots: BTreeMap<PrimitiveDateTime, Vec<Option<Provider>>>,
}

impl SlotIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, at: PrimitiveDateTime, provider: Option<Provider>) {
        self.slots.entry(at).or_default().push(provider);
    }

    /// Folds another day's slots into this index. Days are queried once each,
    /// so timestamps never collide across merges; entries under an equal
    /// timestamp are appended.
    pub fn merge(&mut self, other: SlotIndex) {
        for (at, providers) in other.slots {
            self.slots.entry(at).or_default().extend(providers);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&PrimitiveDateTime, &Vec<Option<Provider>>)> {
        self.slots.iter()
    }

    pub fn get(&self, at: &PrimitiveDateTime) -> Option<&Vec<Option<Provider>>> {
        self.slots.get(at)
    }
}

impl Serialize for SlotIndex {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (at, providers) in &self.slots {
            map.serialize_entry(&format_datetime(*at), providers)?;
        }
        map.end()
    }
}
