//! Value checks shared by clap parsers and merged configuration.

use url::Url;

/// Longest request timeout accepted, in seconds.
const MAX_TIMEOUT_SECS: u64 = 600;

/// Parse a base URL, requiring an absolute `http` or `https` URL.
pub(super) fn parse_base_url(s: &str) -> Result<Url, String> {
    let url = Url::parse(s.trim()).map_err(|err| format!("'{s}' is not a valid URL: {err}"))?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        scheme => Err(format!("'{s}' must use http or https, not '{scheme}'")),
    }
}

/// Parse a per-request timeout in whole seconds.
pub(super) fn parse_timeout(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("{s} is not a valid number of seconds"))?;
    check_timeout(value)
}

pub(super) fn check_timeout(value: u64) -> Result<u64, String> {
    if (1..=MAX_TIMEOUT_SECS).contains(&value) {
        Ok(value)
    } else {
        Err(format!("timeout must be between 1 and {MAX_TIMEOUT_SECS} seconds"))
    }
}
