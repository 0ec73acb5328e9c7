//! Candidate URL cleanup and validation.
//!
//! Links come back from a language model as free text, so they are
//! normalized before anything is sent to a provider.

use std::sync::LazyLock;

use regex::Regex;
use url::{Host, Url};

/// Everything outside the unreserved + reserved URL character sets.
static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^a-zA-Z0-9\-._~:/?#\[\]@!$&'()*+,;=]").expect("url whitelist regex")
});

/// Outcome of [`sanitize_and_validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedUrl {
    /// The cleaned URL text.
    pub cleaned: String,
    /// Whether `cleaned` has an http(s) scheme and a usable host.
    pub valid: bool,
}

/// Clean a candidate URL and report whether it is usable.
///
/// Trims whitespace, prepends `http://` when no http(s) scheme is present,
/// strips characters outside the URL whitelist, then parses. Never fails:
/// anything unparseable is reported as invalid. Idempotent.
pub fn sanitize_and_validate(raw: &str) -> SanitizedUrl {
    let trimmed = raw.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let cleaned = DISALLOWED_RE.replace_all(&with_scheme, "").into_owned();
    let valid = has_scheme_and_host(&cleaned);

    SanitizedUrl { cleaned, valid }
}

/// A host counts if it is an IP literal, `localhost`, or a dotted domain
/// with no empty labels. One trailing root dot is allowed.
fn has_scheme_and_host(candidate: &str) -> bool {
    let Ok(url) = Url::parse(candidate) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        Some(Host::Domain(domain)) => {
            let domain = domain.strip_suffix('.').unwrap_or(domain);
            domain == "localhost"
                || (domain.contains('.') && domain.split('.').all(|label| !label.is_empty()))
        }
        None => false,
    }
}
