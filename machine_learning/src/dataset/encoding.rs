use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::record::Sex;

/// How the categorical column is turned into numeric columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SexEncoding {
    /// A single column, `1.0` for the first fitted level and `0.0` for the rest.
    ///
    /// With the three levels present the remaining two collapse into the same value.
    #[default]
    Indicator,
    /// One column per fitted level.
    OneHot,
}

/// Which rows the encoder is fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FitScope {
    /// Every row of the file, test rows included.
    #[default]
    All,
    /// Only the first `n` rows.
    Prefix(usize),
    /// Only the first `floor(len * fraction)` rows, the same prefix `Split` trains on.
    Fraction(f64),
}

impl FitScope {
    /// Returns the amount of leading rows to fit on out of `len`.
    pub fn rows(self, len: usize) -> usize {
        match self {
            FitScope::All => len,
            FitScope::Prefix(n) => n.min(len),
            FitScope::Fraction(f) => ((len as f64 * f.clamp(0., 1.)).floor() as usize).min(len),
        }
    }
}

/// A categorical encoder fitted once over a column of `Sex` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SexEncoder {
    encoding: SexEncoding,
    levels: Vec<Sex>,
}

impl SexEncoder {
    /// Fits the encoder over the given values.
    ///
    /// The levels are the sorted distinct values seen.
    pub fn fit<I>(encoding: SexEncoding, values: I) -> Self
    where
        I: IntoIterator<Item = Sex>,
    {
        let levels: BTreeSet<Sex> = values.into_iter().collect();

        Self {
            encoding,
            levels: levels.into_iter().collect(),
        }
    }

    pub fn encoding(&self) -> SexEncoding {
        self.encoding
    }

    pub fn levels(&self) -> &[Sex] {
        &self.levels
    }

    /// The amount of numeric columns this encoder produces.
    pub fn width(&self) -> usize {
        match self.encoding {
            SexEncoding::Indicator => 1,
            SexEncoding::OneHot => self.levels.len(),
        }
    }

    /// The names of the produced columns given the categorical column's name.
    pub fn column_names(&self, column: &str) -> Vec<String> {
        match self.encoding {
            SexEncoding::Indicator => vec![column.to_string()],
            SexEncoding::OneHot => self
                .levels
                .iter()
                .map(|level| format!("{column}_{level}"))
                .collect(),
        }
    }

    /// Writes the encoding of `value` into `out`, which must be `width()` long.
    ///
    /// Values that weren't seen while fitting encode as zeros.
    pub fn encode_into(&self, value: Sex, out: &mut [f32]) {
        out.fill(0.);

        match self.encoding {
            SexEncoding::Indicator => {
                if self.levels.first() == Some(&value) {
                    out[0] = 1.;
                }
            }
            SexEncoding::OneHot => {
                if let Some(pos) = self.levels.iter().position(|&level| level == value) {
                    out[pos] = 1.;
                }
            }
        }
    }
}
