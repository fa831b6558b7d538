/// Error types for the annotation engine
///
/// None of these cross the public annotation boundary: resource and parse
/// failures are demoted to empty lookup tables during loading, invalid
/// targets become skip outcomes, and a malformed selection range falls back
/// to the unexpanded range. The enum exists so the fetchers and loaders can
/// report precisely what went wrong before the degradation happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonotateError {
    /// A dictionary resource could not be fetched
    ResourceLoad(String),
    /// A dictionary resource was fetched but could not be parsed
    ParseError(String),
    /// Annotation was requested on a disallowed node
    InvalidTarget(String),
    /// A selection range could not be located in its surrounding text
    MalformedRange(String),
    /// General error with context
    Other(String),
}

impl std::fmt::Display for PhonotateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhonotateError::ResourceLoad(msg) => write!(f, "Resource load error: {}", msg),
            PhonotateError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            PhonotateError::InvalidTarget(msg) => write!(f, "Invalid target: {}", msg),
            PhonotateError::MalformedRange(msg) => write!(f, "Malformed range: {}", msg),
            PhonotateError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for PhonotateError {}

/// Result type for annotation engine operations
pub type PhonotateResult<T> = Result<T, PhonotateError>;
