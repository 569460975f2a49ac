//! Error types for the aggregation pipeline and the layout engine.

use std::io;

/// Failures while turning the raw vaccination table into a hierarchy.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A date or numeric field could not be parsed.
    #[error("row {row}: cannot parse {field} from {value:?}")]
    DataFormat {
        /// Zero-based data row index (header excluded).
        row: usize,
        /// Column name.
        field: &'static str,
        /// The offending raw text.
        value: String,
    },

    /// The global date domain could not be established.
    #[error("date domain is empty; cannot derive quarter bins")]
    NullDomain,

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failures while starting a layout run.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A link endpoint does not name any node of the run.
    #[error("link references unknown node {0:?}")]
    UnknownNode(String),

    /// Two nodes were given the same identifier.
    #[error("duplicate node id {0:?}")]
    DuplicateNode(String),
}
