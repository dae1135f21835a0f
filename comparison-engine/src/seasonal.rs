use chrono::{Datelike, NaiveDate};
use common::{Role, RoleTable, SeasonalParameters};
use serde::{Deserialize, Serialize};

/// Which demand rule a date falls under. Highest-priority rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surge {
    None,
    Weekend,
    Holiday,
}

/// Maps a date to a multiplicative surge factor per role
#[derive(Debug, Clone)]
pub struct SeasonalFactorPolicy {
    calendar: SeasonalParameters,
    roles: RoleTable,
}

impl SeasonalFactorPolicy {
    pub fn new(calendar: SeasonalParameters, roles: RoleTable) -> Self {
        Self { calendar, roles }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        date.month() == self.calendar.holiday_month && date.day() <= self.calendar.holiday_days
    }

    pub fn is_surge_weekday(&self, date: NaiveDate) -> bool {
        self.calendar.surge_weekdays.contains(&date.weekday())
    }

    pub fn surge(&self, date: NaiveDate) -> Surge {
        if self.is_holiday(date) {
            Surge::Holiday
        } else if self.is_surge_weekday(date) {
            Surge::Weekend
        } else {
            Surge::None
        }
    }

    pub fn factor(&self, date: NaiveDate, role: Role) -> f64 {
        let policy = self.roles.for_role(role);
        match self.surge(date) {
            Surge::Holiday => policy.holiday_factor,
            Surge::Weekend => policy.weekend_factor,
            Surge::None => 1.0,
        }
    }

    /// First holiday-window date inside `[start, end]`
    pub fn first_holiday_between(&self, start: NaiveDate, end: NaiveDate) -> Option<NaiveDate> {
        start
            .iter_days()
            .take_while(|d| *d <= end)
            .find(|d| self.is_holiday(*d))
    }
}

impl Default for SeasonalFactorPolicy {
    fn default() -> Self {
        Self::new(SeasonalParameters::default(), RoleTable::default())
    }
}
