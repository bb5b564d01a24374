use arrow::datatypes::DataType;

/// Errors that can occur while encoding a record batch into a payload
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Nesting deeper than the encoder's depth budget
    #[error("nesting depth exceeds the configured maximum of {max_depth}")]
    MaxRecursionExceeded {
        /// The depth budget the encoder was constructed with.
        max_depth: i64,
    },

    /// Array length exceeds the 32-bit bound while 64-bit lengths are disabled
    #[error("array of length {length} exceeds the 32-bit length bound")]
    ArrayTooLarge {
        /// Length of the offending array.
        length: usize,
    },

    /// A data type outside the supported set reached the traversal
    #[error("unsupported data type: {0}")]
    UnsupportedType(DataType),

    /// Failure while encoding a top-level column
    #[error("could not encode column {index} ({name:?}): {source}")]
    Column {
        /// Index of the column in the record batch.
        index: usize,
        /// Name of the column.
        name: String,
        /// The underlying failure.
        source: Box<EncodeError>,
    },

    /// Failure while encoding a struct member
    #[error("could not encode struct child {index}: {source}")]
    StructChild {
        /// Index of the member within the struct.
        index: usize,
        /// The underlying failure.
        source: Box<EncodeError>,
    },

    /// Failure while encoding the values of a list
    #[error("could not encode list values: {source}")]
    ListValues {
        /// The underlying failure.
        source: Box<EncodeError>,
    },
}

impl EncodeError {
    /// Innermost error, unwrapping the contextual layers.
    pub fn root_cause(&self) -> &EncodeError {
        match self {
            EncodeError::Column { source, .. }
            | EncodeError::StructChild { source, .. }
            | EncodeError::ListValues { source } => source.root_cause(),
            other => other,
        }
    }
}
