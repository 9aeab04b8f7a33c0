//! Non-leap calendar arithmetic for hourly year-long series.

use crate::error::CalendarError;

/// Days per month of a 365-day year.
pub const MONTH_LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Hours in one calendar day.
pub const HOURS_PER_DAY: usize = 24;

/// Hourly entries in one non-leap year.
pub const HOURS_PER_YEAR: usize = 8760;

/// Returns the number of days in `month` (1-based).
///
/// # Errors
///
/// Returns [`CalendarError::Month`] if `month` is outside `1..=12`.
pub fn days_in_month(month: u32) -> Result<u32, CalendarError> {
    if !(1..=12).contains(&month) {
        return Err(CalendarError::Month(month));
    }
    Ok(MONTH_LENGTHS[(month - 1) as usize])
}

/// A validated (month, day) pair with its first absolute hour cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    month: u32,
    day: u32,
    first_hour: usize,
}

impl CalendarDay {
    /// Validates a 1-based (month, day) pair.
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarError`] if the month or the day is out of range.
    pub fn new(month: u32, day: u32) -> Result<Self, CalendarError> {
        let days_in_month = days_in_month(month)?;
        if day == 0 || day > days_in_month {
            return Err(CalendarError::Day {
                month,
                day,
                days_in_month,
            });
        }

        let prior_days: u32 = MONTH_LENGTHS[..(month - 1) as usize].iter().sum();
        Ok(Self {
            month,
            day,
            first_hour: (prior_days + day - 1) as usize * HOURS_PER_DAY,
        })
    }

    /// Month, 1-based.
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day of month, 1-based.
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Absolute hour index of hour 0 of this day.
    pub fn first_hour(&self) -> usize {
        self.first_hour
    }

    /// Absolute hour index of `hour` (0-based) on this day.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::Hour`] if `hour >= 24`.
    pub fn hour_index(&self, hour: usize) -> Result<usize, CalendarError> {
        if hour >= HOURS_PER_DAY {
            return Err(CalendarError::Hour(hour));
        }
        Ok(self.first_hour + hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn months_sum_to_a_year() {
        let days: u32 = MONTH_LENGTHS.iter().sum();
        assert_eq!(days as usize * HOURS_PER_DAY, HOURS_PER_YEAR);
    }

    #[rstest]
    #[case(1, 1, 0)]
    #[case(1, 2, 24)]
    #[case(2, 1, 31 * 24)]
    #[case(3, 1, 59 * 24)]
    #[case(12, 31, 364 * 24)]
    fn first_hour_matches_cumulative_days(
        #[case] month: u32,
        #[case] day: u32,
        #[case] expected: usize,
    ) {
        let d = CalendarDay::new(month, day).expect("valid day");
        assert_eq!(d.first_hour(), expected);
    }

    #[test]
    fn last_hour_of_year_is_in_range() {
        let d = CalendarDay::new(12, 31).expect("valid day");
        assert_eq!(d.hour_index(23), Ok(HOURS_PER_YEAR - 1));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(13, 1)]
    #[case(2, 29)]
    #[case(4, 31)]
    #[case(6, 0)]
    fn rejects_invalid_days(#[case] month: u32, #[case] day: u32) {
        assert!(CalendarDay::new(month, day).is_err());
    }

    #[test]
    fn rejects_hour_24() {
        let d = CalendarDay::new(6, 15).expect("valid day");
        assert_eq!(d.hour_index(24), Err(CalendarError::Hour(24)));
    }
}
