use thiserror::Error;

use crate::Length;

/// Structural failure while decoding an encoded polyline.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecodeError {
    #[error("polyline string is empty")]
    Empty,
    #[error("polyline byte {byte:#04x} at offset {offset} is outside the encoding alphabet")]
    InvalidByte { byte: u8, offset: usize },
    #[error("polyline ends inside a multi-byte group")]
    TruncatedGroup,
    #[error("polyline value group exceeds 64 bits")]
    ValueOverflow,
    #[error("polyline carries a latitude without a matching longitude")]
    DanglingOrdinate,
    #[error("polyline decodes to fewer than 2 coordinates")]
    TooFewCoordinates,
}

/// Invalid validation configuration. Fatal: rejected before any row is
/// processed, unlike per-row data errors which stay in-band.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum ConfigError {
    #[error("no validation check is enabled")]
    NoChecksEnabled,
    #[error("length and coverage checks require the Hausdorff check")]
    MissingHausdorff,
    #[error("Hausdorff threshold must be a positive distance: {0:?}")]
    InvalidHausdorffThreshold(Length),
    #[error("length ratio range is not an interval: [{0}, {1}]")]
    InvalidLengthRatioRange(f64, f64),
    #[error("coverage minimum must be within [0, 1]: {0}")]
    InvalidCoverageMinimum(f64),
    #[error("sampling interval must be a positive distance: {0:?}")]
    InvalidSamplingInterval(Length),
}

/// Whole-batch structural problem in the reporting layer.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum TableError {
    #[error("results have {results} rows but the observation table has {rows}")]
    LengthMismatch { rows: usize, results: usize },
}
