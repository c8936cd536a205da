use crate::date_range::DateRange;
use crate::error::SeriesError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single daily precipitation reading, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Observation { date, value }
    }
}

/// A daily precipitation record, ordered by date.
///
/// Dates are unique and strictly ascending, values are finite and
/// non-negative. Filtering operations return a new series and leave
/// `self` untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations already sorted by date.
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        for obs in &observations {
            if !obs.value.is_finite() || obs.value < 0.0 {
                return Err(SeriesError::InvalidValue {
                    date: obs.date,
                    value: obs.value,
                });
            }
        }
        for window in observations.windows(2) {
            let (previous, next) = (window[0].date, window[1].date);
            if previous == next {
                return Err(SeriesError::DuplicateDate(next));
            }
            if previous > next {
                return Err(SeriesError::Unsorted { previous, next });
            }
        }
        Ok(TimeSeries { observations })
    }

    /// Entries whose date lies in `range`, inclusive on both ends.
    ///
    /// Never fails: a range outside the record yields an empty series.
    pub fn restrict_to_range(&self, range: &DateRange) -> TimeSeries {
        self.retain(|obs| range.contains(&obs.date))
    }

    /// Entries with strictly positive precipitation. Dry days are not events.
    pub fn filter_positive(&self) -> TimeSeries {
        self.retain(|obs| obs.value > 0.0)
    }

    fn retain<F>(&self, keep: F) -> TimeSeries
    where
        F: Fn(&Observation) -> bool,
    {
        TimeSeries {
            observations: self.observations.iter().filter(|o| keep(o)).copied().collect(),
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.value)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
