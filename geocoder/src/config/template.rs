//! URL query templates.

use std::fmt;

use url::form_urlencoded;

/// Error returned when a URL template does not hold exactly one `%s`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("QUERY_TEMPLATE value has an invalid format: {reason}")]
pub struct InvalidTemplate {
    reason: &'static str,
}

/// A URL template with exactly one `%s` placeholder.
///
/// `%%` stands for a literal percent sign. Any other `%` sequence is
/// rejected, so expanding a template can only ever insert the query once.
///
/// # Examples
///
/// ```
/// use geocoder::config::QueryTemplate;
///
/// let template = QueryTemplate::parse("http://example.com/?q=%s&pct=100%%").unwrap();
/// assert_eq!(template.expand("Paris"), "http://example.com/?q=Paris&pct=100%");
///
/// assert!(QueryTemplate::parse("http://example.com/").is_err());
/// assert!(QueryTemplate::parse("http://example.com/?q=%s&r=%s").is_err());
/// assert!(QueryTemplate::parse("http://example.com/?q=%d").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct QueryTemplate(String);

impl QueryTemplate {
    /// Validate a URL template.
    pub fn parse(s: &str) -> Result<Self, InvalidTemplate> {
        let bytes = s.as_bytes();
        let mut found = false;
        let mut i = 0;

        while i < bytes.len() {
            if bytes[i] == b'%' {
                match bytes.get(i + 1) {
                    Some(b'%') => i += 1,
                    Some(b's') => {
                        if found {
                            return Err(InvalidTemplate {
                                reason: "more than one %s placeholder",
                            });
                        }
                        found = true;
                        i += 1;
                    }
                    _ => {
                        return Err(InvalidTemplate {
                            reason: "only %s and %% escapes are allowed",
                        });
                    }
                }
            }
            i += 1;
        }

        if !found {
            return Err(InvalidTemplate {
                reason: "missing %s placeholder",
            });
        }

        Ok(QueryTemplate(s.to_string()))
    }

    /// Substitute `value` for the placeholder and unescape `%%`.
    ///
    /// `value` is inserted verbatim; escape it first with
    /// [`escape_query_value`].
    pub fn expand(&self, value: &str) -> String {
        let mut out = String::with_capacity(self.0.len() + value.len());
        let mut chars = self.0.chars();

        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('s') => out.push_str(value),
                Some(other) => out.push(other),
                None => {}
            }
        }

        out
    }

    /// Returns the raw template.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QueryTemplate({})", self.0)
    }
}

impl fmt::Display for QueryTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Escape a value for use inside a URL query string.
pub fn escape_query_value(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
