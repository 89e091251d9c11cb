//! Decoder error types.

/// Errors from decoding a response body.
///
/// Individual fields that fail to parse are left unset rather than reported.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is not well-formed XML
    #[error("malformed XML: {0}")]
    Xml(String),

    /// No `searchresults` element in the document
    #[error("no searchresults element in response")]
    MissingResults,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            DecodeError::Xml("unexpected end".into()).to_string(),
            "malformed XML: unexpected end"
        );
        assert_eq!(
            DecodeError::MissingResults.to_string(),
            "no searchresults element in response"
        );
    }
}
