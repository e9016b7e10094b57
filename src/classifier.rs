//! Stateless mapping of comparison metrics to a validity verdict.

use tracing::trace;

use crate::{CheckSet, Context, GeometryComparison, Length, ValidCode, ValidationParameters};

/// Classifies one compared observation.
///
/// The verdict and the code digit are independent: `is_valid` is the AND over
/// the enabled checks, while the digit records only which checks were enabled.
/// An exact geometric match (Hausdorff == 0) pre-empts both — the code ends
/// in 0 and the row is valid regardless of the remaining checks.
pub fn classify(
    comparison: &GeometryComparison,
    params: &ValidationParameters,
    checks: CheckSet,
    context: Context,
) -> (bool, ValidCode) {
    if comparison.hausdorff == Length::ZERO {
        trace!("Exact geometric match in {context} context");
        return (true, ValidCode::Exact(context));
    }

    let mut is_valid = comparison.hausdorff <= params.hausdorff_threshold;

    if checks.length_check() {
        let pass = match comparison.length_ratio {
            Some(ratio) => {
                let (min_ratio, max_ratio) = params.length_ratio_range;
                min_ratio <= ratio && ratio <= max_ratio
            }
            // undefined ratio: a zero-length reference only matches an
            // equally degenerate observation
            None => comparison.observed_length == Length::ZERO,
        };
        is_valid = is_valid && pass;
    }

    if checks.coverage_check() {
        is_valid = is_valid && comparison.coverage >= params.coverage_minimum;
    }

    trace!(
        "Classified {context} row as {} with Hausdorff {:?}",
        if is_valid { "valid" } else { "invalid" },
        comparison.hausdorff
    );

    (is_valid, ValidCode::Checked(context, checks))
}
