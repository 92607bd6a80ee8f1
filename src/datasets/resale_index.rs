//! Quarterly HDB resale price index.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use super::DatasetError;
use super::parse::{RESALE_INDEX_FILE, parse_resale_index_rows};

/// A calendar quarter, written `YYYYQn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quarter {
    year: i32,
    quarter: u8,
}

impl Quarter {
    /// `None` unless `quarter` is 1..=4.
    #[must_use]
    pub fn new(year: i32, quarter: u8) -> Option<Self> {
        (1..=4).contains(&quarter).then_some(Self { year, quarter })
    }

    /// The quarter containing `date`.
    #[must_use]
    pub fn from_date(date: time::Date) -> Self {
        let month = u8::from(date.month());
        Self { year: date.year(), quarter: (month - 1) / 3 + 1 }
    }

    #[must_use]
    pub fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub fn quarter(self) -> u8 {
        self.quarter
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Q{}", self.year, self.quarter)
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (year, quarter) = s
            .split_once(['Q', 'q'])
            .ok_or_else(|| format!("quarter '{s}' is not YYYYQn"))?;
        let year = year
            .trim()
            .trim_end_matches('-')
            .parse::<i32>()
            .map_err(|_| format!("quarter '{s}' has an invalid year"))?;
        let quarter = quarter
            .trim()
            .parse::<u8>()
            .map_err(|_| format!("quarter '{s}' has an invalid quarter number"))?;
        Self::new(year, quarter).ok_or_else(|| format!("quarter '{s}' is not in 1..=4"))
    }
}

impl Serialize for Quarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Index value per quarter.
#[derive(Debug, Clone, Default)]
pub struct ResaleIndex {
    values: BTreeMap<Quarter, f64>,
}

impl ResaleIndex {
    #[must_use]
    pub fn new(values: BTreeMap<Quarter, f64>) -> Self {
        Self { values }
    }

    /// Parse `resale_index.csv` (`quarter`, `index`).
    ///
    /// # Errors
    ///
    /// Returns a [`DatasetError`] for malformed rows or quarters.
    pub fn parse(text: &str) -> Result<Self, DatasetError> {
        let mut values = BTreeMap::new();
        for (line, row) in parse_resale_index_rows(text)? {
            let quarter = row
                .quarter
                .parse::<Quarter>()
                .map_err(|message| DatasetError::Csv { file: RESALE_INDEX_FILE, line, message })?;
            if !row.index.is_finite() {
                return Err(DatasetError::Csv {
                    file: RESALE_INDEX_FILE,
                    line,
                    message: format!("index '{}' is not finite", row.index),
                });
            }
            values.insert(quarter, row.index);
        }
        Ok(Self::new(values))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The index for `quarter`, or for the latest earlier quarter when that
    /// quarter has not been published yet.
    #[must_use]
    pub fn lookup(&self, quarter: Quarter) -> Option<(Quarter, f64)> {
        self.values
            .range(..=quarter)
            .next_back()
            .map(|(q, v)| (*q, *v))
    }
}

#[cfg(test)]
#[path = "resale_index_test.rs"]
mod tests;
