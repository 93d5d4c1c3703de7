use url::Url;

use crate::error::ValidationError;

/// Checks that `candidate` is an absolute http(s) URL with a host.
///
/// Validation only: the returned [`Url`] is the parser's view of the input,
/// callers that persist the URL keep the submitted string.
pub fn validate_url(candidate: &str) -> Result<Url, ValidationError> {
    // the parser silently strips or repairs these, but the raw string is what gets stored
    if candidate.chars().any(|c| c.is_ascii_whitespace() || c.is_ascii_control()) {
        return Err(ValidationError::InvalidUrl);
    }

    let parsed = Url::parse(candidate).map_err(|_| ValidationError::InvalidUrl)?;

    if !has_authority(candidate, parsed.scheme().len()) || parsed.host_str().map_or(true, str::is_empty) {
        return Err(ValidationError::InvalidUrl);
    }

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(ValidationError::UnsupportedScheme),
    }
}

/// True when `scheme://` is followed by a non-empty authority in the raw input.
fn has_authority(candidate: &str, scheme_len: usize) -> bool {
    let Some(rest) = candidate.get(scheme_len..).and_then(|r| r.strip_prefix("://")) else {
        return false;
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    end > 0
}
