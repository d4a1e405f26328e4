use thiserror::Error;

/// Errors from the source forge.
///
/// A blank detail document is not represented here: the forge intermittently
/// returns empty payloads for valid release identifiers, and the client
/// reports that as `Ok(None)` so callers can skip the release.
#[derive(Debug, Error)]
pub enum NforgeError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Http(String),

    /// The forge answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Api { status: u16, url: String },

    /// A document could not be parsed.
    #[error("malformed document: {0}")]
    Xml(String),

    /// A document parsed but lacked a required element.
    #[error("document is missing <{0}>")]
    MissingField(&'static str),
}
