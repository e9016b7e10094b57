use std::iter::Sum;
use std::ops::{Add, Sub};

use approx::abs_diff_eq;

use crate::error::ConfigError;
use crate::{CheckSet, ValidCode};

/// Coordinate pair of WGS84 longitude (lon) and latitude (lat) values.
/// Encoded polylines carry positions in decamicrodegree resolution
/// (five decimals), so equality is checked with an absolute epsilon.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        const EPSILON: f64 = 1e-9;
        abs_diff_eq!(self.lon, other.lon, epsilon = EPSILON)
            && abs_diff_eq!(self.lat, other.lat, epsilon = EPSILON)
    }
}

impl Coordinate {
    /// Returns true if both ordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && self.lon >= -180.0
            && self.lon <= 180.0
            && self.lat >= -90.0
            && self.lat <= 90.0
    }
}

/// Distance in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Length(f64);

impl Length {
    pub const ZERO: Self = Self(0.0);

    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn meters(&self) -> f64 {
        self.0
    }

    pub fn round(&self) -> Self {
        Self(self.0.round())
    }

    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }
}

impl Add for Length {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Length {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// One recorded route observation.
///
/// Ancillary metrics (duration, distance, speed, ...) are not part of the
/// audit and stay with the caller; validation results align with the input
/// rows by position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    /// Identifier of the road segment this route was recorded for.
    pub segment_id: String,
    /// Index of the route alternative within its request, when the source
    /// recorded alternatives at all.
    pub route_alternative: Option<u32>,
    /// Request time in seconds since the Unix epoch.
    pub timestamp: Option<i64>,
    /// Encoded polyline of the observed route geometry.
    pub polyline: Option<String>,
}

/// Which optional fields the observation table carries.
///
/// The context family of a validity code is a property of the table schema,
/// not of an individual row: a table without a route-alternative field is
/// always classified geometry-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSchema {
    pub has_route_alternative: bool,
    pub has_timestamp: bool,
}

impl TableSchema {
    /// Derives the schema from the rows: a field exists if any row sets it.
    pub fn infer(rows: &[Observation]) -> Self {
        Self {
            has_route_alternative: rows.iter().any(|row| row.route_alternative.is_some()),
            has_timestamp: rows.iter().any(|row| row.timestamp.is_some()),
        }
    }
}

/// Immutable batch of observations plus the schema they were recorded with.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    rows: Vec<Observation>,
    schema: TableSchema,
}

impl ObservationTable {
    /// Builds a table, inferring the schema from the rows.
    pub fn new(rows: Vec<Observation>) -> Self {
        let schema = TableSchema::infer(&rows);
        Self { rows, schema }
    }

    /// Builds a table with an explicit schema, e.g. when the source carries
    /// a route-alternative column that happens to be empty.
    pub fn with_schema(rows: Vec<Observation>, schema: TableSchema) -> Self {
        Self { rows, schema }
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub const fn schema(&self) -> TableSchema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Gets the grouping key of the row at `index`.
    ///
    /// Observations sharing (segment id, request timestamp) belong to the
    /// same logical routing request. A row without a usable timestamp falls
    /// back to a singleton group keyed by its position, so malformed input
    /// degrades to per-row verdicts instead of aborting the batch.
    pub fn request_key(&self, index: usize) -> RequestKey<'_> {
        let row = &self.rows[index];
        match row.timestamp {
            Some(timestamp) if self.schema.has_timestamp => RequestKey::Request {
                segment_id: &row.segment_id,
                timestamp,
            },
            _ => RequestKey::Row(index),
        }
    }
}

/// Identity of the logical routing request a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKey<'a> {
    /// Rows sharing segment and request time are alternatives of one request.
    Request { segment_id: &'a str, timestamp: i64 },
    /// Synthetic singleton key for rows that cannot be grouped by timestamp.
    Row(usize),
}

/// Validation thresholds and check selection. Immutable per run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationParameters {
    /// Compare route shapes with the Hausdorff distance.
    pub use_hausdorff: bool,
    /// Compare observed against reference length.
    pub use_length_check: bool,
    /// Require the observed route to cover the reference segment.
    pub use_coverage_check: bool,
    /// Upper bound on the Hausdorff distance. Default: 5 m.
    pub hausdorff_threshold: Length,
    /// Acceptable observed/reference length ratio. Default: [0.90, 1.10].
    pub length_ratio_range: (f64, f64),
    /// Lower bound on the coverage fraction. Default: 0.85.
    pub coverage_minimum: f64,
    /// Buffer distance around the observed path used by the coverage check.
    /// Default: 10 m.
    pub coverage_buffer: Length,
    /// Arc-length step at which the reference is sampled for coverage.
    /// Default: 1 m.
    pub sampling_interval: Length,
    /// Precision the polylines were encoded with. Default: 5.
    pub polyline_precision: u32,
}

impl Default for ValidationParameters {
    fn default() -> Self {
        Self {
            use_hausdorff: true,
            use_length_check: false,
            use_coverage_check: false,
            hausdorff_threshold: Length::from_meters(5.0),
            length_ratio_range: (0.90, 1.10),
            coverage_minimum: 0.85,
            coverage_buffer: Length::from_meters(10.0),
            sampling_interval: Length::from_meters(1.0),
            polyline_precision: 5,
        }
    }
}

impl ValidationParameters {
    /// Validates the check selection and thresholds.
    ///
    /// A configuration problem is fatal for the whole batch and is rejected
    /// before any row is processed, unlike per-row data errors.
    pub fn check_set(&self) -> Result<CheckSet, ConfigError> {
        let checks = match (
            self.use_hausdorff,
            self.use_length_check,
            self.use_coverage_check,
        ) {
            (false, false, false) => return Err(ConfigError::NoChecksEnabled),
            (false, _, _) => return Err(ConfigError::MissingHausdorff),
            (true, false, false) => CheckSet::Hausdorff,
            (true, true, false) => CheckSet::HausdorffLength,
            (true, false, true) => CheckSet::HausdorffCoverage,
            (true, true, true) => CheckSet::All,
        };

        if !(self.hausdorff_threshold > Length::ZERO && self.hausdorff_threshold.is_finite()) {
            return Err(ConfigError::InvalidHausdorffThreshold(
                self.hausdorff_threshold,
            ));
        }

        let (min_ratio, max_ratio) = self.length_ratio_range;
        if !(min_ratio.is_finite() && max_ratio.is_finite() && min_ratio <= max_ratio) {
            return Err(ConfigError::InvalidLengthRatioRange(min_ratio, max_ratio));
        }

        if !(0.0..=1.0).contains(&self.coverage_minimum) {
            return Err(ConfigError::InvalidCoverageMinimum(self.coverage_minimum));
        }

        if !(self.sampling_interval > Length::ZERO && self.sampling_interval.is_finite()) {
            return Err(ConfigError::InvalidSamplingInterval(self.sampling_interval));
        }

        Ok(checks)
    }
}

/// Per-observation validation outcome.
///
/// Metrics are `None` when they could not be computed (data-error rows), when
/// the corresponding check is disabled, or for the undefined length ratio of
/// a zero-length reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationResult {
    /// True iff every enabled check passed its threshold.
    pub is_valid: bool,
    pub code: ValidCode,
    pub hausdorff_m: Option<f64>,
    pub length_ratio: Option<f64>,
    pub coverage: Option<f64>,
}

impl ValidationResult {
    pub(crate) const fn data_error(error: crate::DataError) -> Self {
        Self {
            is_valid: false,
            code: ValidCode::DataError(error),
            hausdorff_m: None,
            length_ratio: None,
            coverage: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::DataError;

    #[test]
    fn schema_inferred_from_rows() {
        let rows = vec![
            Observation {
                segment_id: "s_1-2".to_string(),
                timestamp: Some(100),
                ..Default::default()
            },
            Observation {
                segment_id: "s_1-2".to_string(),
                route_alternative: Some(1),
                ..Default::default()
            },
        ];

        let schema = TableSchema::infer(&rows);
        assert!(schema.has_route_alternative);
        assert!(schema.has_timestamp);

        assert_eq!(TableSchema::infer(&[]), TableSchema::default());
    }

    #[test]
    fn request_key_groups_by_segment_and_timestamp() {
        let table = ObservationTable::new(vec![
            Observation {
                segment_id: "s_1-2".to_string(),
                timestamp: Some(100),
                ..Default::default()
            },
            Observation {
                segment_id: "s_1-2".to_string(),
                timestamp: Some(100),
                ..Default::default()
            },
            Observation {
                segment_id: "s_1-2".to_string(),
                timestamp: None,
                ..Default::default()
            },
        ]);

        assert_eq!(table.request_key(0), table.request_key(1));
        assert_eq!(table.request_key(2), RequestKey::Row(2));
    }

    #[test]
    fn request_key_without_timestamp_field_is_positional() {
        let table = ObservationTable::new(vec![
            Observation {
                segment_id: "s_1-2".to_string(),
                ..Default::default()
            },
            Observation {
                segment_id: "s_1-2".to_string(),
                ..Default::default()
            },
        ]);

        assert_eq!(table.request_key(0), RequestKey::Row(0));
        assert_eq!(table.request_key(1), RequestKey::Row(1));
    }

    #[test]
    fn parameters_reject_invalid_configurations() {
        let none = ValidationParameters {
            use_hausdorff: false,
            ..Default::default()
        };
        assert_eq!(none.check_set(), Err(ConfigError::NoChecksEnabled));

        let no_hausdorff = ValidationParameters {
            use_hausdorff: false,
            use_length_check: true,
            ..Default::default()
        };
        assert_eq!(no_hausdorff.check_set(), Err(ConfigError::MissingHausdorff));

        let inverted = ValidationParameters {
            length_ratio_range: (1.10, 0.90),
            use_length_check: true,
            ..Default::default()
        };
        assert_eq!(
            inverted.check_set(),
            Err(ConfigError::InvalidLengthRatioRange(1.10, 0.90))
        );

        let negative = ValidationParameters {
            hausdorff_threshold: Length::from_meters(-1.0),
            ..Default::default()
        };
        assert_eq!(
            negative.check_set(),
            Err(ConfigError::InvalidHausdorffThreshold(Length::from_meters(
                -1.0
            )))
        );
    }

    #[test]
    fn parameters_map_flags_to_check_sets() {
        let configurations = [
            (false, false, CheckSet::Hausdorff),
            (true, false, CheckSet::HausdorffLength),
            (false, true, CheckSet::HausdorffCoverage),
            (true, true, CheckSet::All),
        ];

        for (length, coverage, expected) in configurations {
            let params = ValidationParameters {
                use_length_check: length,
                use_coverage_check: coverage,
                ..Default::default()
            };
            assert_eq!(params.check_set(), Ok(expected));
        }
    }

    #[test]
    fn data_error_result_has_no_metrics() {
        let result = ValidationResult::data_error(DataError::MissingGeometry);
        assert!(!result.is_valid);
        assert_eq!(result.hausdorff_m, None);
        assert_eq!(result.length_ratio, None);
        assert_eq!(result.coverage, None);
    }

    #[test]
    fn coordinate_validity() {
        assert!(
            Coordinate {
                lon: 34.78,
                lat: 32.08
            }
            .is_valid()
        );
        assert!(
            !Coordinate {
                lon: 181.0,
                lat: 0.0
            }
            .is_valid()
        );
        assert!(
            !Coordinate {
                lon: 0.0,
                lat: 95.0
            }
            .is_valid()
        );
        assert!(
            !Coordinate {
                lon: f64::NAN,
                lat: 0.0
            }
            .is_valid()
        );
    }
}
