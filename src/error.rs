use thiserror::Error;

/// Errors returned by the trajectory clustering pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter or input value is out of range or malformed.
    #[error("invalid argument {name}: {message}")]
    InvalidArgument {
        /// Argument name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// A trajectory has no points.
    #[error("degenerate trajectory '{id}'{}: no points", position_suffix(.index))]
    DegenerateInput {
        /// Position of the trajectory in its batch, when known.
        index: Option<usize>,
        /// Trajectory identifier.
        id: String,
    },

    /// The trajectory document could not be decoded into records.
    #[error("malformed trajectory document: {message}")]
    Document {
        /// Decoder message, including line and column when available.
        message: String,
    },
}

fn position_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at index {i}")).unwrap_or_default()
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// True for [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }

    /// True for [`Error::DegenerateInput`].
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Error::DegenerateInput { .. })
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = Error::invalid("window_size", "must be finite");
        assert_eq!(err.to_string(), "invalid argument window_size: must be finite");
        assert!(err.is_invalid_argument());

        let err = Error::DegenerateInput {
            index: Some(4),
            id: "car-7".to_string(),
        };
        assert_eq!(err.to_string(), "degenerate trajectory 'car-7' at index 4: no points");
        assert!(err.is_degenerate());

        let err = Error::DegenerateInput {
            index: None,
            id: "car-7".to_string(),
        };
        assert_eq!(err.to_string(), "degenerate trajectory 'car-7': no points");
    }
}
