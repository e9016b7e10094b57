#![doc = include_str!("../README.md")]

mod classifier;
mod code;
mod error;
mod geometry;
mod index;
mod model;
mod polyline;
mod projection;
mod report;
mod validator;

pub use classifier::classify;
pub use code::{CheckSet, Context, DataError, ValidCode};
pub use error::{ConfigError, DecodeError, TableError};
pub use geometry::{GeometryComparison, compare_geometries, hausdorff_distance};
pub use index::{ReferenceFeature, ReferenceIndex, ReferenceSegment};
pub use model::{
    Coordinate, Length, Observation, ObservationTable, RequestKey, TableSchema,
    ValidationParameters, ValidationResult,
};
pub use polyline::{decode_polyline, encode_polyline};
pub use projection::{LocalEquirectangular, Planar, Projection};
pub use report::{RequestVerdict, SegmentQualityReport, resolve_requests, segment_quality};
#[cfg(feature = "parallel")]
pub use validator::validate_table_parallel;
pub use validator::validate_table;
