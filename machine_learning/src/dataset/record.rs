use std::{fmt, str::FromStr};

use crate::{MlErr, Result};

/// The amount of fields every line of the input file carries.
pub const NUM_FIELDS: usize = 9;

/// The amount of continuous measurements of a specimen.
pub const NUM_MEASUREMENTS: usize = 7;

/// The column names of the abalone dataset, in file order.
pub const ABALONE_COLUMNS: [&str; NUM_FIELDS] = [
    "sex",
    "length",
    "diameter",
    "height",
    "whole_weight",
    "shucked_weight",
    "viscera_weight",
    "shell_weight",
    "rings",
];

/// The categorical attribute of a specimen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Female,
    Infant,
    Male,
}

impl Sex {
    /// The symbol used for this level in the input file.
    pub fn symbol(self) -> &'static str {
        match self {
            Sex::Female => "F",
            Sex::Infant => "I",
            Sex::Male => "M",
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "F" => Ok(Sex::Female),
            "I" => Ok(Sex::Infant),
            "M" => Ok(Sex::Male),
            other => Err(format!("unknown sex {other:?}, expected one of M, F, I")),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One physical specimen as read from a single line of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub sex: Sex,
    pub measurements: [f32; NUM_MEASUREMENTS],
    pub rings: u32,
}

impl Record {
    /// Parses a whitespace-delimited line into a `Record`.
    ///
    /// # Arguments
    /// * `line` - The raw line, without its terminator.
    /// * `line_no` - The 1-based physical line number, used for error reporting.
    ///
    /// # Returns
    /// The parsed record or a `MlErr::Parse` naming the offending line.
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let parse_err = |reason: String| MlErr::Parse {
            line: line_no,
            reason,
        };

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != NUM_FIELDS {
            return Err(parse_err(format!(
                "expected {NUM_FIELDS} fields, got {}",
                fields.len()
            )));
        }

        let sex = fields[0].parse().map_err(parse_err)?;

        let mut measurements = [0.; NUM_MEASUREMENTS];
        for (i, (m, raw)) in measurements.iter_mut().zip(&fields[1..=NUM_MEASUREMENTS]).enumerate() {
            *m = raw.parse().map_err(|_| {
                parse_err(format!(
                    "column {:?} is not numeric: {raw:?}",
                    ABALONE_COLUMNS[i + 1]
                ))
            })?;
        }

        let raw_rings = fields[NUM_FIELDS - 1];
        let rings = raw_rings
            .parse()
            .map_err(|_| parse_err(format!("rings is not a non-negative integer: {raw_rings:?}")))?;

        Ok(Self {
            sex,
            measurements,
            rings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_line() {
        let line = "M 0.455 0.365 0.095 0.514 0.2245 0.101 0.15 15";
        let record = Record::parse(line, 1).unwrap();

        assert_eq!(record.sex, Sex::Male);
        assert_eq!(record.measurements[0], 0.455);
        assert_eq!(record.measurements[6], 0.15);
        assert_eq!(record.rings, 15);
    }

    #[test]
    fn tolerates_tabs_and_repeated_spaces() {
        let line = "I\t0.33  0.255 0.08 0.205 0.0895 0.0395 0.055   7";
        let record = Record::parse(line, 3).unwrap();

        assert_eq!(record.sex, Sex::Infant);
        assert_eq!(record.rings, 7);
    }

    #[test]
    fn wrong_field_count_names_the_line() {
        let err = Record::parse("F 0.53 0.42", 12).unwrap_err();
        assert!(matches!(err, MlErr::Parse { line: 12, .. }));
    }

    #[test]
    fn non_numeric_measurement_is_rejected() {
        let line = "F 0.53 abc 0.135 0.677 0.2565 0.1415 0.21 9";
        let err = Record::parse(line, 4).unwrap_err();

        let MlErr::Parse { line, reason } = err else {
            panic!("expected a parse error");
        };
        assert_eq!(line, 4);
        assert!(reason.contains("diameter"));
    }

    #[test]
    fn unknown_sex_is_rejected() {
        let line = "X 0.53 0.42 0.135 0.677 0.2565 0.1415 0.21 9";
        assert!(matches!(
            Record::parse(line, 2),
            Err(MlErr::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn fractional_rings_are_rejected() {
        let line = "F 0.53 0.42 0.135 0.677 0.2565 0.1415 0.21 9.5";
        assert!(Record::parse(line, 1).is_err());
    }
}
