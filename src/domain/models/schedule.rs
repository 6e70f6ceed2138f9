use std::collections::BTreeMap;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fixed, ordered time labels per weekday. Index 0 is Sunday, 6 is Saturday.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(transparent)]
pub struct WeeklySchedule {
    days: BTreeMap<u8, Vec<String>>,
}

impl WeeklySchedule {
    pub fn empty() -> Self {
        Self { days: BTreeMap::new() }
    }

    pub fn with_day<S: Into<String>>(mut self, weekday: u8, labels: impl IntoIterator<Item = S>) -> Self {
        self.days.insert(weekday % 7, labels.into_iter().map(Into::into).collect());
        self
    }

    pub fn slots_for_weekday(&self, weekday: u8) -> &[String] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn slots_for(&self, date: NaiveDate) -> &[String] {
        self.slots_for_weekday(weekday_index(date))
    }
}

pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::empty()
            .with_day(0, Vec::<String>::new())
            .with_day(1, ["10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM"])
            .with_day(2, ["11:00 AM", "2:00 PM"])
            .with_day(3, ["10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM"])
            .with_day(4, ["12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM", "6:00 PM"])
            .with_day(5, ["10:00 AM", "11:00 AM", "12:00 PM", "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM"])
            .with_day(6, Vec::<String>::new())
    }
}
