//! Validity code model.
//!
//! The legacy output format is a two-part integer: a context prefix (how
//! route alternatives were recorded) plus a final digit (exact match, the
//! enabled check configuration, or a data-error subtype). Core logic works
//! on the typed model below; the integer exists only at the output boundary.

use strum::Display;

/// How route alternatives were recorded for the row's table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Context {
    /// The table has no route-alternative field.
    GeometryOnly,
    /// The row's (segment, timestamp) group has exactly one member.
    SingleAlternative,
    /// The row's (segment, timestamp) group has more than one member.
    MultiAlternative,
}

impl Context {
    pub(crate) const fn prefix(self) -> u16 {
        match self {
            Self::GeometryOnly => 0,
            Self::SingleAlternative => 20,
            Self::MultiAlternative => 30,
        }
    }
}

/// Which geometry checks a run has enabled.
///
/// Exactly these four combinations exist: the Hausdorff check anchors every
/// configuration, and the final code digit encodes the combination alone,
/// never a pass/fail outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckSet {
    Hausdorff,
    HausdorffLength,
    HausdorffCoverage,
    All,
}

impl CheckSet {
    pub const fn digit(self) -> u16 {
        match self {
            Self::Hausdorff => 1,
            Self::HausdorffLength => 2,
            Self::HausdorffCoverage => 3,
            Self::All => 4,
        }
    }

    pub const fn length_check(self) -> bool {
        matches!(self, Self::HausdorffLength | Self::All)
    }

    pub const fn coverage_check(self) -> bool {
        matches!(self, Self::HausdorffCoverage | Self::All)
    }
}

/// Why a row could not be geometrically classified.
/// Data errors pre-empt geometric classification entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum DataError {
    /// The observation carries no polyline.
    MissingGeometry,
    /// The segment identifier is absent from the reference index.
    UnknownSegment,
    /// The polyline could not be decoded.
    CorruptGeometry,
    /// Any other malformed-data condition, e.g. non-finite coordinates.
    Malformed,
}

impl DataError {
    pub const fn code(self) -> u16 {
        match self {
            Self::MissingGeometry => 90,
            Self::UnknownSegment => 91,
            Self::CorruptGeometry => 92,
            Self::Malformed => 93,
        }
    }
}

/// Validity code of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidCode {
    /// The observed geometry matches the reference exactly (Hausdorff == 0).
    /// Pre-empts the configuration digit.
    Exact(Context),
    /// The row was classified under the given check configuration.
    Checked(Context, CheckSet),
    /// The row could not be classified geometrically.
    DataError(DataError),
}

impl ValidCode {
    /// Converts to the legacy integer representation.
    pub const fn code(self) -> u16 {
        match self {
            Self::Exact(context) => context.prefix(),
            Self::Checked(context, checks) => context.prefix() + checks.digit(),
            Self::DataError(error) => error.code(),
        }
    }

    /// Parses a legacy integer code back into the typed model.
    pub const fn try_from_code(code: u16) -> Option<Self> {
        let context = match code {
            0..=4 => Context::GeometryOnly,
            20..=24 => Context::SingleAlternative,
            30..=34 => Context::MultiAlternative,
            90 => return Some(Self::DataError(DataError::MissingGeometry)),
            91 => return Some(Self::DataError(DataError::UnknownSegment)),
            92 => return Some(Self::DataError(DataError::CorruptGeometry)),
            93 => return Some(Self::DataError(DataError::Malformed)),
            _ => return None,
        };

        let checks = match code % 10 {
            0 => return Some(Self::Exact(context)),
            1 => CheckSet::Hausdorff,
            2 => CheckSet::HausdorffLength,
            3 => CheckSet::HausdorffCoverage,
            4 => CheckSet::All,
            _ => return None,
        };

        Some(Self::Checked(context, checks))
    }

    pub const fn is_data_error(self) -> bool {
        matches!(self, Self::DataError(_))
    }

    pub const fn context(self) -> Option<Context> {
        match self {
            Self::Exact(context) | Self::Checked(context, _) => Some(context),
            Self::DataError(_) => None,
        }
    }
}
