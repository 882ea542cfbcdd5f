//! Error types for the clustree core library.
//!
//! Every public error enum carries a stable machine-readable code so callers
//! and log pipelines can match on failures without parsing messages.

use std::{fmt, path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::identity::{ClusterLabel, NodeId, Resolution};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while assembling a [`crate::MembershipTable`] or while
/// discovering its resolution columns.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum MembershipError {
    /// No resolution columns were supplied.
    #[error("membership table requires at least one resolution column")]
    NoColumns,
    /// Resolution columns were supplied but contain no samples.
    #[error("membership table contains no samples")]
    EmptyTable,
    /// More resolution columns were supplied than identities can address.
    #[error("membership table has {count} resolutions but at most {max} are supported")]
    TooManyResolutions {
        /// Number of resolution columns supplied.
        count: usize,
        /// Largest supported number of resolutions.
        max: u32,
    },
    /// A resolution column disagreed with the first column about the sample count.
    #[error("resolution {resolution} has {found} rows but resolution 1 has {expected}")]
    ColumnLengthMismatch {
        /// Resolution whose column had the wrong length.
        resolution: Resolution,
        /// Row count of the first resolution column.
        expected: usize,
        /// Row count of the offending column.
        found: usize,
    },
    /// A label fell outside the valid range for its resolution.
    #[error("label {label} at resolution {resolution}, row {row} is outside {min}..={max}")]
    LabelOutOfRange {
        /// Resolution column holding the label.
        resolution: Resolution,
        /// Zero-based sample row.
        row: usize,
        /// Offending label value.
        label: i64,
        /// Smallest valid label at this resolution.
        min: ClusterLabel,
        /// Largest valid label at this resolution.
        max: ClusterLabel,
    },
    /// A metadata column disagreed with the resolution columns about the sample count.
    #[error("metadata column `{column}` has {found} rows but the table has {expected}")]
    MetadataLengthMismatch {
        /// Name of the metadata column.
        column: String,
        /// Row count of the membership table.
        expected: usize,
        /// Row count of the metadata column.
        found: usize,
    },
    /// The minimum cluster number was neither 0 nor 1.
    #[error("min_cluster_number must be 0 or 1 (got {got})")]
    InvalidIndexingConvention {
        /// Value supplied by the caller.
        got: i64,
    },
    /// No header carried the resolution prefix followed by an integer.
    #[error("no columns named `{prefix}<K>` were found")]
    NoResolutionColumns {
        /// Prefix that was searched for.
        prefix: String,
    },
    /// A header carried the prefix but named resolution zero.
    #[error("column `{column}` names resolution 0; resolutions start at 1")]
    InvalidResolutionColumn {
        /// Offending column name.
        column: String,
    },
    /// Two headers named the same resolution.
    #[error("resolution {resolution} appears more than once for prefix `{prefix}`")]
    DuplicateResolution {
        /// Prefix shared by the duplicate columns.
        prefix: String,
        /// Resolution named twice.
        resolution: Resolution,
    },
    /// The discovered resolutions skipped a value.
    #[error("resolution columns for prefix `{prefix}` skip resolution {missing}")]
    NonConsecutiveResolutions {
        /// Prefix of the resolution columns.
        prefix: String,
        /// First resolution with no column.
        missing: Resolution,
    },
    /// The caller asked for zero resolutions or for more than exist.
    #[error("requested {requested} resolutions but {available} are available")]
    RequestedResolutionsUnavailable {
        /// Number of resolutions requested.
        requested: usize,
        /// Number of resolution columns discovered.
        available: usize,
    },
}

define_error_codes! {
    /// Stable codes describing [`MembershipError`] variants.
    enum MembershipErrorCode for MembershipError {
        /// No resolution columns were supplied.
        NoColumns => NoColumns => "MEMBERSHIP_NO_COLUMNS",
        /// Resolution columns contain no samples.
        EmptyTable => EmptyTable => "MEMBERSHIP_EMPTY_TABLE",
        /// More resolution columns were supplied than identities can address.
        TooManyResolutions => TooManyResolutions { .. } => "MEMBERSHIP_TOO_MANY_RESOLUTIONS",
        /// Resolution columns have different lengths.
        ColumnLengthMismatch => ColumnLengthMismatch { .. } => "MEMBERSHIP_COLUMN_LENGTH_MISMATCH",
        /// A label fell outside the valid range for its resolution.
        LabelOutOfRange => LabelOutOfRange { .. } => "MEMBERSHIP_LABEL_OUT_OF_RANGE",
        /// A metadata column has the wrong length.
        MetadataLengthMismatch => MetadataLengthMismatch { .. } => "MEMBERSHIP_METADATA_LENGTH_MISMATCH",
        /// The minimum cluster number was neither 0 nor 1.
        InvalidIndexingConvention => InvalidIndexingConvention { .. } => "MEMBERSHIP_INVALID_INDEXING_CONVENTION",
        /// No header carried the resolution prefix.
        NoResolutionColumns => NoResolutionColumns { .. } => "MEMBERSHIP_NO_RESOLUTION_COLUMNS",
        /// A header named resolution zero.
        InvalidResolutionColumn => InvalidResolutionColumn { .. } => "MEMBERSHIP_INVALID_RESOLUTION_COLUMN",
        /// Two headers named the same resolution.
        DuplicateResolution => DuplicateResolution { .. } => "MEMBERSHIP_DUPLICATE_RESOLUTION",
        /// The discovered resolutions skipped a value.
        NonConsecutiveResolutions => NonConsecutiveResolutions { .. } => "MEMBERSHIP_NON_CONSECUTIVE_RESOLUTIONS",
        /// The caller asked for zero resolutions or for more than exist.
        RequestedResolutionsUnavailable => RequestedResolutionsUnavailable { .. } => "MEMBERSHIP_REQUESTED_RESOLUTIONS_UNAVAILABLE",
    }
}

/// An error produced when a configuration value cannot be parsed.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    /// The text is neither a hex color nor a palette reference.
    #[error("`{raw}` is not a color; expected #rrggbb, #rrggbbaa, C0..C9 or tab:<name>")]
    InvalidColor {
        /// Text that failed to parse.
        raw: String,
    },
    /// The colormap name is not one of the built-in maps.
    #[error("unknown colormap `{name}`")]
    UnknownColormap {
        /// Name that failed to resolve.
        name: String,
    },
    /// The aggregator name is not one of the built-in aggregators.
    #[error("unknown aggregator `{name}`")]
    UnknownAggregator {
        /// Name that failed to resolve.
        name: String,
    },
}

define_error_codes! {
    /// Stable codes describing [`ParseError`] variants.
    enum ParseErrorCode for ParseError {
        /// The text is not a color.
        InvalidColor => InvalidColor { .. } => "PARSE_INVALID_COLOR",
        /// The colormap name is unknown.
        UnknownColormap => UnknownColormap { .. } => "PARSE_UNKNOWN_COLORMAP",
        /// The aggregator name is unknown.
        UnknownAggregator => UnknownAggregator { .. } => "PARSE_UNKNOWN_AGGREGATOR",
    }
}

/// An error produced by an [`crate::ImageProvider`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ImageError {
    /// The image root directory does not exist.
    #[error("image directory `{}` does not exist", path.display())]
    MissingDirectory {
        /// Directory that was expected to hold node images.
        path: PathBuf,
    },
    /// No image exists for a node and placeholders are disabled.
    #[error("image `{}` does not exist", path.display())]
    Missing {
        /// Path that was probed.
        path: PathBuf,
    },
}

define_error_codes! {
    /// Stable codes describing [`ImageError`] variants.
    enum ImageErrorCode for ImageError {
        /// The image root directory does not exist.
        MissingDirectory => MissingDirectory { .. } => "IMAGE_MISSING_DIRECTORY",
        /// No image exists for a node.
        Missing => Missing { .. } => "IMAGE_MISSING",
    }
}

/// A structural invariant of a [`crate::ClusterTree`] that failed to hold.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InvariantError {
    /// The tree was assembled without sample information.
    #[error("tree carries no sample information")]
    SampleInfoMissing,
    /// Node counts at one resolution do not add up to the sample total.
    #[error("nodes at resolution {resolution} hold {found} samples, expected {expected}")]
    NodeTotal {
        /// Resolution whose nodes were summed.
        resolution: Resolution,
        /// Number of samples in the table.
        expected: usize,
        /// Sum of node counts.
        found: usize,
    },
    /// Incoming edges of a node do not add up to its sample count.
    #[error("incoming edges of node {node} hold {found} samples, expected {expected}")]
    IncomingTotal {
        /// Destination node.
        node: NodeId,
        /// Sample count of the node.
        expected: usize,
        /// Sum of incoming edge counts.
        found: usize,
    },
    /// Incoming flow fractions of a node do not sum to one.
    #[error("incoming flow fractions of node {node} sum to {sum}")]
    FlowFraction {
        /// Destination node.
        node: NodeId,
        /// Observed sum of fractions.
        sum: f64,
    },
    /// An edge ends at the first resolution.
    #[error("edge {edge} ends at resolution 1")]
    EdgeAtFirstResolution {
        /// Offending edge identifier.
        edge: crate::identity::EdgeId,
    },
}

define_error_codes! {
    /// Stable codes describing [`InvariantError`] variants.
    enum InvariantErrorCode for InvariantError {
        /// The tree was assembled without sample information.
        SampleInfoMissing => SampleInfoMissing => "INVARIANT_SAMPLE_INFO_MISSING",
        /// Node counts do not add up to the sample total.
        NodeTotal => NodeTotal { .. } => "INVARIANT_NODE_TOTAL",
        /// Incoming edges do not add up to the node count.
        IncomingTotal => IncomingTotal { .. } => "INVARIANT_INCOMING_TOTAL",
        /// Incoming flow fractions do not sum to one.
        FlowFraction => FlowFraction { .. } => "INVARIANT_FLOW_FRACTION",
        /// An edge ends at the first resolution.
        EdgeAtFirstResolution => EdgeAtFirstResolution { .. } => "INVARIANT_EDGE_AT_FIRST_RESOLUTION",
    }
}

/// Error type produced when configuring or running [`crate::Clustree`].
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ClustreeError {
    /// Aggregate coloring was requested without an aggregator.
    #[error("node color column `{column}` requires an aggregator")]
    MissingAggregator {
        /// Metadata column named by the strategy.
        column: String,
    },
    /// Aggregate coloring named a column the table does not carry.
    #[error("membership table has no metadata column `{column}`")]
    UnknownColumn {
        /// Metadata column named by the strategy.
        column: String,
    },
    /// The image provider failed for a node.
    #[error("image provider `{provider}` failed for node {resolution}_{label}: {error}")]
    Image {
        /// Name of the image provider.
        provider: Arc<str>,
        /// Resolution of the node.
        resolution: Resolution,
        /// Label of the node.
        label: ClusterLabel,
        #[source]
        /// Underlying provider error.
        error: ImageError,
    },
    /// The membership table could not be assembled.
    #[error(transparent)]
    Membership(#[from] MembershipError),
}

define_error_codes! {
    /// Stable codes describing [`ClustreeError`] variants.
    enum ClustreeErrorCode for ClustreeError {
        /// Aggregate coloring was requested without an aggregator.
        MissingAggregator => MissingAggregator { .. } => "CLUSTREE_MISSING_AGGREGATOR",
        /// Aggregate coloring named an unknown column.
        UnknownColumn => UnknownColumn { .. } => "CLUSTREE_UNKNOWN_COLUMN",
        /// The image provider failed for a node.
        ImageFailure => Image { .. } => "CLUSTREE_IMAGE_FAILURE",
        /// The membership table could not be assembled.
        MembershipFailure => Membership { .. } => "CLUSTREE_MEMBERSHIP_FAILURE",
    }
}

impl ClustreeError {
    /// Retrieve the inner [`ImageErrorCode`] when an image provider failed.
    pub const fn image_code(&self) -> Option<ImageErrorCode> {
        match self {
            Self::Image { error, .. } => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`MembershipErrorCode`] when table assembly failed.
    pub const fn membership_code(&self) -> Option<MembershipErrorCode> {
        match self {
            Self::Membership(error) => Some(error.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, ClustreeError>;
