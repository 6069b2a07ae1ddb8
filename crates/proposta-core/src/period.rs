//! # Contract Periods
//!
//! The simulation form takes a start and end date typed by a person
//! (`dd/mm/yyyy`). This module turns them into a [`Horizon`].
//!
//! ## Month Counting
//! ```text
//!   01/01/2025 → 31/12/2025   11 whole months + 1  = 12
//!   15/01/2025 → 14/02/2025    0 whole months + 1  =  1
//!   15/01/2025 → 15/02/2025    1 whole month  + 1  =  2
//!   31/01/2024 → 29/02/2024    1 whole month  + 1  =  2   (month-end clamp)
//! ```
//! A whole month is counted when adding it to the start date (clamped to the
//! end of a shorter month) does not pass the end date.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, PeriodError};
use crate::projection::Horizon;

const BR_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Period {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, PeriodError> {
        if end < start {
            return Err(PeriodError::EndBeforeStart { start, end });
        }
        Ok(Period { start, end })
    }

    /// Parses `dd/mm/yyyy` (or ISO `yyyy-mm-dd`) dates.
    ///
    /// ## Example
    /// ```rust
    /// use proposta_core::period::Period;
    ///
    /// let period = Period::parse("01/01/2025", "31/12/2025").unwrap();
    /// assert_eq!(period.duration_months(), 12);
    ///
    /// assert!(Period::parse("2025-13-01", "31/12/2025").is_err());
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self, PeriodError> {
        Period::new(parse_date("start date", start)?, parse_date("end date", end)?)
    }

    /// Inclusive count of months covered, at least 1.
    pub fn duration_months(&self) -> u32 {
        let calendar_diff = (self.end.year() - self.start.year()) * 12 + self.end.month() as i32
            - self.start.month() as i32;
        let mut months = calendar_diff.max(0) as u32;

        while months > 0 && !self.whole_months_fit(months) {
            months -= 1;
        }

        months + 1
    }

    fn whole_months_fit(&self, months: u32) -> bool {
        self.start
            .checked_add_months(Months::new(months))
            .is_some_and(|date| date <= self.end)
    }

    /// Forecast horizon starting at the first month of the period.
    pub fn horizon(&self) -> CoreResult<Horizon> {
        Horizon::new(self.start, self.duration_months()).map_err(CoreError::from)
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, PeriodError> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, BR_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
        .map_err(|_| PeriodError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}
