//! Batch validation of an observation table.
//!
//! 1. Validate the configuration (fatal on error, before any row).
//! 2. Precompute (segment, timestamp) group sizes for context classification.
//! 3. Per row, in input order: record data errors in-band (missing geometry,
//!    corrupt geometry, unknown segment, malformed coordinates), otherwise
//!    decode, project, compare and classify.
//!
//! Rows never abort the batch: the output always has one result per input
//! row, in the same order, and a geometric code only ever appears when both
//! sides of the comparison were well-formed.

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::classifier::classify;
use crate::geometry::compare_geometries;
use crate::polyline::decode_polyline;
use crate::{
    CheckSet, Context, Coordinate, DataError, ObservationTable, Projection, ReferenceIndex,
    RequestKey, ValidationParameters, ValidationResult,
};

use crate::error::ConfigError;

/// Validates every observation of the table against the reference network.
///
/// Returns one [`ValidationResult`] per row, preserving input order. Only an
/// invalid configuration aborts the run; every data problem is recorded in
/// its row.
pub fn validate_table<P: Projection>(
    table: &ObservationTable,
    reference: &ReferenceIndex,
    projection: &P,
    params: &ValidationParameters,
) -> Result<Vec<ValidationResult>, ConfigError> {
    let checks = params.check_set()?;
    let group_sizes = request_group_sizes(table);

    debug!(
        "Validating {} observations over {} requests against {} reference segments",
        table.len(),
        group_sizes.len(),
        reference.len()
    );

    Ok((0..table.len())
        .map(|index| validate_row(table, index, &group_sizes, reference, projection, params, checks))
        .collect())
}

/// Parallel variant of [`validate_table`] with identical, order-preserving
/// output. Safe because each row only reads the shared immutable index and
/// parameters.
#[cfg(feature = "parallel")]
pub fn validate_table_parallel<P: Projection + Sync>(
    table: &ObservationTable,
    reference: &ReferenceIndex,
    projection: &P,
    params: &ValidationParameters,
) -> Result<Vec<ValidationResult>, ConfigError> {
    use rayon::prelude::*;

    let checks = params.check_set()?;
    let group_sizes = request_group_sizes(table);

    debug!(
        "Validating {} observations in parallel over {} requests",
        table.len(),
        group_sizes.len()
    );

    Ok((0..table.len())
        .into_par_iter()
        .map(|index| validate_row(table, index, &group_sizes, reference, projection, params, checks))
        .collect())
}

fn validate_row<P: Projection>(
    table: &ObservationTable,
    index: usize,
    group_sizes: &FxHashMap<RequestKey<'_>, usize>,
    reference: &ReferenceIndex,
    projection: &P,
    params: &ValidationParameters,
    checks: CheckSet,
) -> ValidationResult {
    let row = &table.rows()[index];

    let Some(polyline) = row.polyline.as_deref().filter(|encoded| !encoded.is_empty()) else {
        trace!("Row {index}: missing polyline");
        return ValidationResult::data_error(DataError::MissingGeometry);
    };

    let decoded = match decode_polyline(polyline, params.polyline_precision) {
        Ok(coordinates) => coordinates,
        Err(error) => {
            trace!("Row {index}: {error}");
            return ValidationResult::data_error(DataError::CorruptGeometry);
        }
    };

    let Some(segment) = reference.get(&row.segment_id) else {
        trace!("Row {index}: segment {} not in reference", row.segment_id);
        return ValidationResult::data_error(DataError::UnknownSegment);
    };

    if !decoded.iter().all(Coordinate::is_valid) {
        trace!("Row {index}: implausible decoded coordinates");
        return ValidationResult::data_error(DataError::Malformed);
    }

    if !segment.geometry.coords().all(|c| c.x.is_finite() && c.y.is_finite()) {
        trace!("Row {index}: non-finite reference geometry");
        return ValidationResult::data_error(DataError::Malformed);
    }

    let observed = projection.project_line(&decoded);
    let comparison =
        compare_geometries(&observed, segment, params.coverage_buffer, params.sampling_interval);

    let context = row_context(table, index, group_sizes);
    let (is_valid, code) = classify(&comparison, params, checks, context);

    ValidationResult {
        is_valid,
        code,
        hausdorff_m: Some(comparison.hausdorff.meters()),
        length_ratio: checks.length_check().then_some(comparison.length_ratio).flatten(),
        coverage: checks.coverage_check().then_some(comparison.coverage),
    }
}

/// Context family of a row: geometry-only when the schema has no
/// route-alternative field, otherwise single or multi depending on how many
/// rows share the logical request.
fn row_context(
    table: &ObservationTable,
    index: usize,
    group_sizes: &FxHashMap<RequestKey<'_>, usize>,
) -> Context {
    if !table.schema().has_route_alternative {
        return Context::GeometryOnly;
    }

    match group_sizes.get(&table.request_key(index)) {
        Some(&size) if size > 1 => Context::MultiAlternative,
        _ => Context::SingleAlternative,
    }
}

pub(crate) fn request_group_sizes(table: &ObservationTable) -> FxHashMap<RequestKey<'_>, usize> {
    if table.schema().has_route_alternative && !table.schema().has_timestamp && !table.is_empty() {
        warn!("Observation table has no timestamp field: every row forms its own request group");
    }

    let mut sizes = FxHashMap::default();
    for index in 0..table.len() {
        *sizes.entry(table.request_key(index)).or_insert(0) += 1;
    }
    sizes
}
