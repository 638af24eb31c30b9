/*!
 * Cross-origin policy for the alignment endpoint.
 *
 * The policy is built once from [`CorsConfig`] when the server starts and is
 * shared read-only by every connection afterwards.
 */

use url::Url;

use crate::app_config::CorsConfig;

// @const: Methods advertised when every method is allowed
pub const ALL_METHODS: [&str; 7] = ["DELETE", "GET", "HEAD", "OPTIONS", "PATCH", "POST", "PUT"];

// @const: Headers a browser may always send without a preflight
const SAFELISTED_HEADERS: [&str; 4] = ["accept", "accept-language", "content-language", "content-type"];

/// A response header as name/value
pub type Header = (String, String);

/// Reason a preflight was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreflightRejection {
    Origin,
    Method,
    Headers,
}

impl PreflightRejection {
    /// Plain text body sent with the 400 response
    pub fn message(&self) -> &'static str {
        match self {
            Self::Origin => "Disallowed CORS origin",
            Self::Method => "Disallowed CORS method",
            Self::Headers => "Disallowed CORS headers",
        }
    }
}

/// Immutable cross-origin policy
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_all_origins: bool,
    allowed_origins: Vec<String>,
    allow_all_methods: bool,
    allowed_methods: Vec<String>,
    allow_all_headers: bool,
    allowed_headers: Vec<String>,
    allow_credentials: bool,
    max_age_secs: u64,
}

impl CorsPolicy {
    /// Build the policy, normalizing configured origins, methods and headers
    ///
    /// Origins that do not parse are dropped; `Config::validate` reports them.
    pub fn from_config(config: &CorsConfig) -> Self {
        CorsPolicy {
            allow_all_origins: config.allow_all_origins,
            allowed_origins: config.allowed_origins.iter().filter_map(|o| normalize_origin(o)).collect(),
            allow_all_methods: config.allow_all_methods,
            allowed_methods: config.allowed_methods.iter().map(|m| m.trim().to_ascii_uppercase()).collect(),
            allow_all_headers: config.allow_all_headers,
            allowed_headers: config.allowed_headers.iter().map(|h| h.trim().to_ascii_lowercase()).collect(),
            allow_credentials: config.allow_credentials,
            max_age_secs: config.max_age_secs,
        }
    }

    /// Fully permissive policy
    pub fn permissive() -> Self {
        Self::from_config(&CorsConfig::default())
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.allow_all_origins {
            return true;
        }
        normalize_origin(origin).is_some_and(|o| self.allowed_origins.contains(&o))
    }

    pub fn is_method_allowed(&self, method: &str) -> bool {
        let method = method.trim().to_ascii_uppercase();
        if self.allow_all_methods {
            return ALL_METHODS.contains(&method.as_str());
        }
        self.allowed_methods.contains(&method)
    }

    /// Check a comma separated `Access-Control-Request-Headers` value
    pub fn are_headers_allowed(&self, requested: &str) -> bool {
        if self.allow_all_headers {
            return true;
        }
        requested
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .all(|h| SAFELISTED_HEADERS.contains(&h.as_str()) || self.allowed_headers.contains(&h))
    }

    /// Headers added to an actual (non-preflight) response
    ///
    /// Empty when the request carries no origin or the origin is not allowed.
    pub fn response_headers(&self, origin: Option<&str>) -> Vec<Header> {
        match origin {
            Some(origin) if self.is_origin_allowed(origin) => self.origin_headers(origin),
            _ => Vec::new(),
        }
    }

    /// Answer a preflight request
    pub fn preflight_headers(
        &self,
        origin: &str,
        requested_method: &str,
        requested_headers: Option<&str>,
    ) -> Result<Vec<Header>, PreflightRejection> {
        if !self.is_origin_allowed(origin) {
            return Err(PreflightRejection::Origin);
        }
        if !self.is_method_allowed(requested_method) {
            return Err(PreflightRejection::Method);
        }
        if let Some(requested) = requested_headers {
            if !self.are_headers_allowed(requested) {
                return Err(PreflightRejection::Headers);
            }
        }

        let mut headers = self.origin_headers(origin);

        let methods = if self.allow_all_methods {
            ALL_METHODS.join(", ")
        } else {
            self.allowed_methods.join(", ")
        };
        headers.push(("Access-Control-Allow-Methods".to_string(), methods));

        let allow_headers = if self.allow_all_headers {
            requested_headers.map(str::trim).filter(|h| !h.is_empty()).map(str::to_string)
        } else {
            let mut listed: Vec<String> = SAFELISTED_HEADERS.iter().map(|h| h.to_string()).collect();
            listed.extend(self.allowed_headers.iter().cloned());
            Some(listed.join(", "))
        };
        if let Some(allow_headers) = allow_headers {
            headers.push(("Access-Control-Allow-Headers".to_string(), allow_headers));
        }

        headers.push(("Access-Control-Max-Age".to_string(), self.max_age_secs.to_string()));
        Ok(headers)
    }

    fn origin_headers(&self, origin: &str) -> Vec<Header> {
        let mut headers = Vec::new();

        // Browsers refuse a wildcard origin on credentialed requests
        if self.allow_all_origins && !self.allow_credentials {
            headers.push(("Access-Control-Allow-Origin".to_string(), "*".to_string()));
        } else {
            headers.push(("Access-Control-Allow-Origin".to_string(), origin.to_string()));
            headers.push(("Vary".to_string(), "Origin".to_string()));
        }

        if self.allow_credentials {
            headers.push(("Access-Control-Allow-Credentials".to_string(), "true".to_string()));
        }

        headers
    }
}

/// Serialized scheme://host[:port] form of an origin, if it parses
fn normalize_origin(origin: &str) -> Option<String> {
    let url = Url::parse(origin.trim()).ok()?;
    let serialized = url.origin().ascii_serialization();
    // Opaque origins serialize as "null" and never match
    (serialized != "null").then_some(serialized)
}
