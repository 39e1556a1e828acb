//! RFC 3986 normalisation of external-reference URLs.

use url::{Position, Url};

use crate::error::{BioSamplesError, Result};

use super::hasher::CanonicalHasher;

/// A parsed and normalised URL, split into the components that are hashed.
///
/// Absent components are empty strings, an absent or default port is `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    /// Serialised normalised form.
    pub url: String,
    pub scheme: String,
    /// Everything between `scheme:` and the fragment.
    pub scheme_specific_part: String,
    pub user_info: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl NormalizedUrl {
    /// Write the components in their fixed order.
    pub fn write_canonical(&self, hasher: &mut CanonicalHasher) {
        hasher
            .field(&self.scheme)
            .field(&self.scheme_specific_part)
            .field(&self.user_info)
            .field(&self.host)
            .number(u64::from(self.port))
            .field(&self.path)
            .field(&self.query)
            .field(&self.fragment);
    }
}

/// Normalise a reference URL.
///
/// Scheme and host are lowercased, default ports dropped, dot segments
/// removed and percent-encoding canonicalised. Relative or otherwise
/// unparseable input is a [`BioSamplesError::MalformedReference`].
pub fn normalize_reference_url(raw: &str) -> Result<NormalizedUrl> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(malformed(raw, "empty URL"));
    }

    let url = Url::parse(trimmed).map_err(|e| malformed(raw, &e.to_string()))?;

    let scheme_specific_part = url[Position::AfterScheme..Position::AfterQuery]
        .strip_prefix(':')
        .unwrap_or_default()
        .to_string();

    let user_info = match (url.username(), url.password()) {
        ("", None) => String::new(),
        (user, None) => user.to_string(),
        (user, Some(password)) => format!("{}:{}", user, password),
    };

    Ok(NormalizedUrl {
        url: url.as_str().to_string(),
        scheme: url.scheme().to_string(),
        scheme_specific_part,
        user_info,
        host: url.host_str().unwrap_or_default().to_string(),
        port: url.port().unwrap_or(0),
        path: url.path().to_string(),
        query: url.query().unwrap_or_default().to_string(),
        fragment: url.fragment().unwrap_or_default().to_string(),
    })
}

fn malformed(url: &str, message: &str) -> BioSamplesError {
    BioSamplesError::MalformedReference {
        url: url.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_default_port() {
        let a = normalize_reference_url("HTTPS://WWW.EBI.AC.UK:443/ena/browser/view/ERA123").unwrap();
        let b = normalize_reference_url("https://www.ebi.ac.uk/ena/browser/view/ERA123").unwrap();

        assert_eq!(a, b);
        assert_eq!(a.url, "https://www.ebi.ac.uk/ena/browser/view/ERA123");
        assert_eq!(a.port, 0);
    }

    #[test]
    fn test_removes_dot_segments() {
        let url = normalize_reference_url("http://example.org/a/./b/../c").unwrap();
        assert_eq!(url.path, "/a/c");
    }

    #[test]
    fn test_components() {
        let url =
            normalize_reference_url("http://user:pw@example.org:8080/p?study_id=phs1#frag").unwrap();

        assert_eq!(url.scheme, "http");
        assert_eq!(url.user_info, "user:pw");
        assert_eq!(url.host, "example.org");
        assert_eq!(url.port, 8080);
        assert_eq!(url.query, "study_id=phs1");
        assert_eq!(url.fragment, "frag");
        assert_eq!(url.scheme_specific_part, "//user:pw@example.org:8080/p?study_id=phs1");
    }

    #[test]
    fn test_malformed_is_an_error() {
        for raw in ["", "   ", "not a url", "www.ebi.ac.uk/ena", "http://"] {
            let err = normalize_reference_url(raw).unwrap_err();
            assert!(
                matches!(err, BioSamplesError::MalformedReference { .. }),
                "expected malformed reference for {:?}",
                raw
            );
        }
    }
}
