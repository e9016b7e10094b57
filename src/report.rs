//! Alternative resolution and per-segment quality reporting.
//!
//! A routing request may record several route alternatives for the same
//! (segment, timestamp). One matching alternative is sufficient to trust the
//! request, so each group reduces to a single verdict via OR before any
//! per-segment statistic is aggregated — three alternatives never count as
//! three requests.

use ordered_float::OrderedFloat;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::error::TableError;
use crate::{ObservationTable, RequestKey, ValidationResult};

/// Verdict of one logical routing request, reduced over its alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestVerdict<'a> {
    pub segment_id: &'a str,
    pub timestamp: Option<i64>,
    /// Indices of the member rows, in input order. Never empty.
    pub rows: Vec<usize>,
    /// True iff at least one member alternative is valid.
    pub is_valid: bool,
    /// Member with the lowest Hausdorff distance among the valid members
    /// (among all members when none is valid) — the row an auditor should
    /// look at first.
    pub best_row: usize,
}

impl RequestVerdict<'_> {
    pub fn alternatives(&self) -> usize {
        self.rows.len()
    }

    pub fn is_multi_route(&self) -> bool {
        self.rows.len() > 1
    }
}

/// Per-segment aggregation over all of its resolved requests.
///
/// `valid_requests + invalid_requests == total_requests` and
/// `single_route_requests + multi_route_requests == total_requests` always
/// hold.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentQualityReport {
    pub segment_id: String,
    pub total_requests: usize,
    pub valid_requests: usize,
    pub invalid_requests: usize,
    pub single_route_requests: usize,
    pub multi_route_requests: usize,
    /// Share of valid requests, in percent.
    pub percent_valid: f64,
    /// Lowest Hausdorff distance observed for the segment, when any row of
    /// any of its requests produced one.
    pub best_hausdorff_m: Option<f64>,
    /// Highest Hausdorff distance observed for the segment.
    pub worst_hausdorff_m: Option<f64>,
}

/// Groups validation results by logical request and reduces every group to a
/// single verdict. Groups are emitted in order of first appearance.
///
/// Fails only on a structural mismatch between the two tables; per-row data
/// errors simply resolve to invalid members.
pub fn resolve_requests<'a>(
    table: &'a ObservationTable,
    results: &[ValidationResult],
) -> Result<Vec<RequestVerdict<'a>>, TableError> {
    if table.len() != results.len() {
        return Err(TableError::LengthMismatch {
            rows: table.len(),
            results: results.len(),
        });
    }

    if !table.schema().has_timestamp && !table.is_empty() {
        warn!("Observation table has no timestamp field: resolving every row as its own request");
    }

    let mut order: Vec<RequestKey<'a>> = Vec::new();
    let mut groups: FxHashMap<RequestKey<'a>, Vec<usize>> = FxHashMap::default();

    for index in 0..table.len() {
        let key = table.request_key(index);
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(index);
    }

    let verdicts: Vec<_> = order
        .into_iter()
        .filter_map(|key| {
            let rows = groups.remove(&key)?;
            let &first = rows.first()?;

            let is_valid = rows.iter().any(|&index| results[index].is_valid);
            let best_row = select_best_row(&rows, results, is_valid).unwrap_or(first);
            let observation = &table.rows()[first];

            Some(RequestVerdict {
                segment_id: &observation.segment_id,
                timestamp: observation.timestamp,
                rows,
                is_valid,
                best_row,
            })
        })
        .collect();

    debug!(
        "Resolved {} requests from {} observations",
        verdicts.len(),
        results.len()
    );

    Ok(verdicts)
}

fn select_best_row(
    rows: &[usize],
    results: &[ValidationResult],
    group_is_valid: bool,
) -> Option<usize> {
    rows.iter()
        .copied()
        .filter(|&index| !group_is_valid || results[index].is_valid)
        .min_by_key(|&index| OrderedFloat(results[index].hausdorff_m.unwrap_or(f64::INFINITY)))
}

/// Aggregates resolved requests into one quality report per segment, sorted
/// by segment identifier. Recomputed on demand; never updated in place.
pub fn segment_quality(
    verdicts: &[RequestVerdict<'_>],
    results: &[ValidationResult],
) -> Vec<SegmentQualityReport> {
    #[derive(Default)]
    struct Accumulator {
        total: usize,
        valid: usize,
        single: usize,
        multi: usize,
        best: Option<f64>,
        worst: Option<f64>,
    }

    let mut by_segment: FxHashMap<&str, Accumulator> = FxHashMap::default();

    for verdict in verdicts {
        let accumulator = by_segment.entry(verdict.segment_id).or_default();
        accumulator.total += 1;

        if verdict.is_valid {
            accumulator.valid += 1;
        }
        if verdict.is_multi_route() {
            accumulator.multi += 1;
        } else {
            accumulator.single += 1;
        }

        for &row in &verdict.rows {
            if let Some(hausdorff) = results.get(row).and_then(|result| result.hausdorff_m) {
                accumulator.best = Some(accumulator.best.map_or(hausdorff, |b| b.min(hausdorff)));
                accumulator.worst = Some(accumulator.worst.map_or(hausdorff, |w| w.max(hausdorff)));
            }
        }
    }

    let mut reports: Vec<_> = by_segment
        .into_iter()
        .map(|(segment_id, accumulator)| SegmentQualityReport {
            segment_id: segment_id.to_string(),
            total_requests: accumulator.total,
            valid_requests: accumulator.valid,
            invalid_requests: accumulator.total - accumulator.valid,
            single_route_requests: accumulator.single,
            multi_route_requests: accumulator.multi,
            percent_valid: 100.0 * accumulator.valid as f64 / accumulator.total as f64,
            best_hausdorff_m: accumulator.best,
            worst_hausdorff_m: accumulator.worst,
        })
        .collect();

    reports.sort_unstable_by(|a, b| a.segment_id.cmp(&b.segment_id));

    debug!("Aggregated {} segment quality reports", reports.len());
    reports
}
