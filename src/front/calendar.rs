//! Date picker used by the pet forms: month grid, month navigation and the
//! typed `dd/mm/yy` dates.

use crate::consts;
use chrono::{Datelike, Months, NaiveDate};

/// Column headers of the grid, weeks start on monday
pub const WEEKDAY_HEADERS: [&str; 7] = ["L", "M", "X", "J", "V", "S", "D"];

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };

    first
        .checked_add_months(Months::new(1))
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

/// Cells of the month containing `date`: leading blanks up to the weekday of
/// the first day, then every day of the month
pub fn build_calendar_days(date: NaiveDate) -> Vec<Option<u32>> {
    let first = first_of_month(date);
    let leading_blanks = first.weekday().num_days_from_monday() as usize;

    std::iter::repeat_n(None, leading_blanks)
        .chain((1..=days_in_month(first.year(), first.month())).map(Some))
        .collect()
}

/// First day of the month `delta` months away from the one containing `date`
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let first = first_of_month(date);
    let shifted = if delta >= 0 {
        first.checked_add_months(Months::new(delta.unsigned_abs()))
    } else {
        first.checked_sub_months(Months::new(delta.unsigned_abs()))
    };

    shifted.unwrap_or(first)
}

pub fn is_selected_day(selected: Option<NaiveDate>, visible_month: NaiveDate, day: u32) -> bool {
    selected.is_some_and(|s| {
        s.year() == visible_month.year() && s.month() == visible_month.month() && s.day() == day
    })
}

pub fn format_birth_date(date: NaiveDate) -> String {
    date.format(consts::BIRTH_DATE_DISPLAY_FORMAT).to_string()
}

/// "marzo 2024"
pub fn month_title(date: NaiveDate) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

fn two_digits(part: &str) -> Option<u32> {
    if part.len() != 2 || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Parses `dd/mm/yy` or `dd/mm/yyyy`. Two digit years up to the current one
/// belong to this century, the rest to the previous one.
pub fn parse_typed_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut parts = text.trim().split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    let day = two_digits(day)?;
    let month = two_digits(month)?;

    let year = match year.len() {
        2 => {
            let yy = two_digits(year)? as i32;
            let century = today.year() - today.year().rem_euclid(100);
            if yy <= today.year().rem_euclid(100) {
                century + yy
            } else {
                century - 100 + yy
            }
        }
        4 if year.chars().all(|c| c.is_ascii_digit()) => year.parse().ok()?,
        _ => return None,
    };

    NaiveDate::from_ymd_opt(year, month, day)
}

/// State of the inline date picker of a form
#[derive(Debug, Clone, PartialEq)]
pub struct DatePicker {
    pub is_open: bool,
    pub visible_month: NaiveDate,
    pub selected: Option<NaiveDate>,
}

impl DatePicker {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            is_open: false,
            visible_month: first_of_month(today),
            selected: None,
        }
    }

    pub fn toggle(&mut self) {
        self.is_open = !self.is_open;
    }

    pub fn previous_month(&mut self) {
        self.visible_month = shift_month(self.visible_month, -1);
    }

    pub fn next_month(&mut self) {
        self.visible_month = shift_month(self.visible_month, 1);
    }

    pub fn days(&self) -> Vec<Option<u32>> {
        build_calendar_days(self.visible_month)
    }

    /// Picks `day` of the visible month and closes the picker
    pub fn pick_day(&mut self, day: u32) -> Option<NaiveDate> {
        let picked = NaiveDate::from_ymd_opt(
            self.visible_month.year(),
            self.visible_month.month(),
            day,
        )?;

        self.selected = Some(picked);
        self.is_open = false;
        Some(picked)
    }

    /// Selects a typed date and moves the grid to its month
    pub fn set_date(&mut self, date: NaiveDate) {
        self.selected = Some(date);
        self.visible_month = first_of_month(date);
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }
}
