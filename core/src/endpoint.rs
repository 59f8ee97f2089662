//! Base address validation and request URL construction.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::{ClientError, Result};

/// Everything except ASCII alphanumerics and `-_.~` is escaped, so a space
/// becomes `%20` rather than `+`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Validated base address every request is prefixed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
}

impl Endpoint {
    /// Parse an absolute http(s) address. A trailing `/` is dropped, an
    /// optional path prefix is kept.
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|e| ClientError::InvalidEndpoint(format!("{raw:?}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidEndpoint(format!(
                "{raw:?}: unsupported scheme {:?}",
                url.scheme()
            )));
        }
        if url.host_str().is_none() {
            return Err(ClientError::InvalidEndpoint(format!("{raw:?}: missing host")));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ClientError::InvalidEndpoint(format!(
                "{raw:?}: query and fragment are not allowed"
            )));
        }
        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `{base}/{path}?k1=v1&k2=v2`, with every key and value percent-encoded.
    pub(crate) fn url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut out = format!("{}/{path}", self.base);
        for (i, (key, value)) in params.iter().enumerate() {
            out.push(if i == 0 { '?' } else { '&' });
            out.extend(utf8_percent_encode(key, COMPONENT));
            out.push('=');
            out.extend(utf8_percent_encode(value, COMPONENT));
        }
        out
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}
