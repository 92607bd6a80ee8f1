//! Town encoder: maps a town name to the ordinal the model was trained on.
//!
//! Ordinals rank towns by mean resale price, cheapest first, so the encoded
//! value carries the town's price level as a single number.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use super::DatasetError;

pub const TOWN_ENCODING_FILE: &str = "town_encoding.json";

#[derive(Deserialize)]
struct EncodingFile {
    encoding: HashMap<String, u32>,
}

#[derive(Debug, Clone, Default)]
pub struct TownEncoder {
    encoding: HashMap<String, u32>,
    inverse: HashMap<u32, String>,
}

fn normalize_town(town: &str) -> String {
    town.trim().to_ascii_uppercase()
}

impl TownEncoder {
    fn from_map(encoding: HashMap<String, u32>) -> Self {
        let encoding: HashMap<String, u32> = encoding
            .into_iter()
            .map(|(town, code)| (normalize_town(&town), code))
            .collect();
        let inverse = encoding
            .iter()
            .map(|(town, code)| (*code, town.clone()))
            .collect();
        Self { encoding, inverse }
    }

    /// Parse `{"encoding": {"TOWN": ordinal, ...}}`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Encoder`] for malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, DatasetError> {
        let file: EncodingFile = serde_json::from_str(text)
            .map_err(|e| DatasetError::Encoder(format!("{TOWN_ENCODING_FILE}: {e}")))?;
        Ok(Self::from_map(file.encoding))
    }

    /// Fit from `(town, resale_price)` transactions.
    ///
    /// Towns are ranked by mean price ascending; equal means rank by name.
    #[must_use]
    pub fn fit<'a>(transactions: impl IntoIterator<Item = (&'a str, f64)>) -> Self {
        let mut totals: BTreeMap<String, (f64, u32)> = BTreeMap::new();
        for (town, price) in transactions {
            let entry = totals.entry(normalize_town(town)).or_insert((0.0, 0));
            entry.0 += price;
            entry.1 += 1;
        }

        let mut means: Vec<(String, f64)> = totals
            .into_iter()
            .map(|(town, (sum, n))| (town, sum / f64::from(n)))
            .collect();
        means.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let encoding = means
            .into_iter()
            .zip(0u32..)
            .map(|((town, _), code)| (town, code))
            .collect();
        Self::from_map(encoding)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.encoding.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.encoding.is_empty()
    }

    #[must_use]
    pub fn encode(&self, town: &str) -> Option<u32> {
        self.encoding.get(&normalize_town(town)).copied()
    }

    #[must_use]
    pub fn decode(&self, code: u32) -> Option<&str> {
        self.inverse.get(&code).map(String::as_str)
    }
}

#[cfg(test)]
#[path = "encoder_test.rs"]
mod tests;
