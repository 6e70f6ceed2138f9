use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Personal,
    Vacation,
    Medical,
    Training,
    FederalHoliday,
    Other,
}

/// A whole day taken off the booking calendar. Blocked days are closed, not full.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlockedDate {
    pub date: String,
    pub reason: String,
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub auto_generated: bool,
}

impl BlockedDate {
    pub fn manual(date: NaiveDate, reason: &str, kind: BlockKind) -> Self {
        Self {
            date: date.format("%Y-%m-%d").to_string(),
            reason: reason.trim().to_string(),
            kind,
            auto_generated: false,
        }
    }

    fn holiday(date: NaiveDate, reason: &str) -> Self {
        Self {
            auto_generated: true,
            ..Self::manual(date, reason, BlockKind::FederalHoliday)
        }
    }
}

/// US federal holidays observed by the studio in `year`.
pub fn federal_holidays(year: i32) -> Vec<BlockedDate> {
    let fixed = |month: u32, day: u32| NaiveDate::from_ymd_opt(year, month, day);
    let nth = |month: u32, weekday: Weekday, n: u8| NaiveDate::from_weekday_of_month_opt(year, month, weekday, n);

    [
        (fixed(1, 1), "New Year's Day"),
        (nth(1, Weekday::Mon, 3), "Martin Luther King Jr. Day"),
        (nth(2, Weekday::Mon, 3), "Presidents' Day"),
        (last_weekday_of_month(year, 5, Weekday::Mon), "Memorial Day"),
        (fixed(7, 4), "Independence Day"),
        (nth(9, Weekday::Mon, 1), "Labor Day"),
        (nth(10, Weekday::Mon, 2), "Columbus Day"),
        (fixed(11, 11), "Veterans Day"),
        (nth(11, Weekday::Thu, 4), "Thanksgiving Day"),
        (fixed(12, 25), "Christmas Day"),
    ]
    .into_iter()
    .filter_map(|(date, reason)| date.map(|d| BlockedDate::holiday(d, reason)))
    .collect()
}

/// Adds generated holidays for `from_year` and the `years_ahead` following
/// years that are not listed yet. Returns whether anything was added.
pub fn extend_holidays(blocked: &mut Vec<BlockedDate>, from_year: i32, years_ahead: i32) -> bool {
    let before = blocked.len();
    for year in from_year..=from_year + years_ahead {
        for holiday in federal_holidays(year) {
            if !blocked.iter().any(|b| b.auto_generated && b.date == holiday.date) {
                blocked.push(holiday);
            }
        }
    }
    if blocked.len() == before {
        return false;
    }
    blocked.sort_by(|a, b| a.date.cmp(&b.date));
    true
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }?;
    let last = first_of_next.pred_opt()?;
    let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
    last.checked_sub_signed(Duration::days(i64::from(back)))
}
