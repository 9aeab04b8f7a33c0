//! Year-long hourly store for the exogenous signals.

use crate::data::calendar::{CalendarDay, HOURS_PER_DAY, HOURS_PER_YEAR};
use crate::error::{CalendarError, DataError};

/// One of the three exogenous hourly signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    /// Solar PV generation (kWh per hour, already scaled).
    Solar,
    /// Electricity price (already scaled and floored).
    Price,
    /// Electricity demand (kWh per hour, already aggregated and scaled).
    Demand,
}

impl Series {
    /// Human-readable series name.
    pub fn name(self) -> &'static str {
        match self {
            Series::Solar => "solar",
            Series::Price => "price",
            Series::Demand => "demand",
        }
    }
}

/// Immutable store of three aligned hourly series covering a 365-day year.
///
/// The store is never mutated after construction, so one instance can be
/// shared read-only (e.g. behind an `Arc`) by many environments.
#[derive(Debug, Clone)]
pub struct TimeSeriesStore {
    solar: Vec<f32>,
    price: Vec<f32>,
    demand: Vec<f32>,
}

impl TimeSeriesStore {
    /// Creates a store from three already-scaled hourly series.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Length`] if any series does not hold exactly
    /// 8760 entries.
    pub fn new(solar: Vec<f32>, price: Vec<f32>, demand: Vec<f32>) -> Result<Self, DataError> {
        for (series, values) in [
            (Series::Solar, &solar),
            (Series::Price, &price),
            (Series::Demand, &demand),
        ] {
            if values.len() != HOURS_PER_YEAR {
                return Err(DataError::Length {
                    series: series.name(),
                    actual: values.len(),
                    expected: HOURS_PER_YEAR,
                });
            }
        }
        Ok(Self {
            solar,
            price,
            demand,
        })
    }

    fn values(&self, series: Series) -> &[f32] {
        match series {
            Series::Solar => &self.solar,
            Series::Price => &self.price,
            Series::Demand => &self.demand,
        }
    }

    /// Point lookup by calendar position (`month`, `day` 1-based; `hour` 0-based).
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarError`] for any out-of-range index.
    pub fn get(
        &self,
        series: Series,
        month: u32,
        day: u32,
        hour: usize,
    ) -> Result<f32, CalendarError> {
        let index = CalendarDay::new(month, day)?.hour_index(hour)?;
        Ok(self.values(series)[index])
    }

    /// Returns the 24 hourly values of one calendar day.
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarError`] if the month or day is out of range.
    pub fn get_window(
        &self,
        series: Series,
        month: u32,
        day: u32,
    ) -> Result<&[f32], CalendarError> {
        Ok(self.window(series, CalendarDay::new(month, day)?))
    }

    /// Point lookup for an already-validated day.
    pub(crate) fn at(&self, series: Series, day: CalendarDay, hour: usize) -> f32 {
        self.values(series)[day.first_hour() + hour]
    }

    /// Day window for an already-validated day.
    pub(crate) fn window(&self, series: Series, day: CalendarDay) -> &[f32] {
        let start = day.first_hour();
        &self.values(series)[start..start + HOURS_PER_DAY]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store where every value encodes its own absolute hour index.
    fn indexed_store() -> TimeSeriesStore {
        let ramp: Vec<f32> = (0..HOURS_PER_YEAR).map(|i| i as f32).collect();
        let price = ramp.iter().map(|v| v + 0.5).collect();
        let demand = ramp.iter().map(|v| v * 2.0).collect();
        TimeSeriesStore::new(ramp, price, demand).expect("full year")
    }

    #[test]
    fn rejects_short_series() {
        let full = vec![0.0; HOURS_PER_YEAR];
        let err = TimeSeriesStore::new(full.clone(), vec![0.0; 100], full).unwrap_err();
        assert!(matches!(
            err,
            DataError::Length {
                series: "price",
                actual: 100,
                ..
            }
        ));
    }

    #[test]
    fn point_lookup_uses_absolute_hour_index() {
        let store = indexed_store();
        // Feb 1st, 05:00 -> (31 + 0) * 24 + 5
        assert_eq!(store.get(Series::Solar, 2, 1, 5), Ok((31 * 24 + 5) as f32));
        assert_eq!(store.get(Series::Demand, 1, 1, 0), Ok(0.0));
    }

    #[test]
    fn point_lookup_agrees_with_window() {
        let store = indexed_store();
        for (month, day) in [(1, 1), (3, 15), (6, 30), (12, 31)] {
            for series in [Series::Solar, Series::Price, Series::Demand] {
                let window = store.get_window(series, month, day).expect("valid day");
                assert_eq!(window.len(), HOURS_PER_DAY);
                for (hour, value) in window.iter().enumerate() {
                    assert_eq!(store.get(series, month, day, hour), Ok(*value));
                }
            }
        }
    }

    #[test]
    fn invalid_indices_are_reported() {
        let store = indexed_store();
        assert_eq!(
            store.get(Series::Price, 13, 1, 0),
            Err(CalendarError::Month(13))
        );
        assert!(store.get(Series::Price, 2, 30, 0).is_err());
        assert_eq!(
            store.get(Series::Price, 2, 3, 24),
            Err(CalendarError::Hour(24))
        );
        assert!(store.get_window(Series::Solar, 0, 1).is_err());
    }
}
