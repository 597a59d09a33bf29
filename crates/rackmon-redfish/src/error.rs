/// Errors raised while talking to a Redfish service or decoding its documents.
///
/// Transport failures (`Http`, `Network`) and payload failures (`Decode`) are
/// kept apart so callers can decide whether a single branch is lost or the
/// whole session is unusable.
///
/// # Examples
///
/// ```rust
/// use rackmon_redfish::error::RedfishError;
///
/// let err = RedfishError::Auth("session token missing".to_string());
/// assert!(err.to_string().contains("session token missing"));
/// assert!(!err.is_decode());
/// ```
#[derive(Debug, thiserror::Error)]
pub enum RedfishError {
    /// Opening the session failed; wraps the underlying cause.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: Box<RedfishError>,
    },

    /// The service accepted the request but refused or mangled authentication.
    #[error("authentication error: {0}")]
    Auth(String),

    /// Non-2xx status code for a request.
    #[error("{path} returned HTTP {status}: {body}")]
    Http {
        path: String,
        status: u16,
        body: String,
    },

    /// Underlying transport error from `reqwest` (connect, TLS, timeout).
    #[error("network error on {path}: {source}")]
    Network {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// Payload at `path` is not valid JSON or does not match the resource shape.
    #[error("cannot decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint could not be turned into a base URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl RedfishError {
    pub fn is_decode(&self) -> bool {
        matches!(self, RedfishError::Decode { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            RedfishError::Http { .. } | RedfishError::Network { .. }
        )
    }

    pub(crate) fn decode(path: &str, source: serde_json::Error) -> Self {
        RedfishError::Decode {
            path: path.to_string(),
            source,
        }
    }
}

/// Convenience type alias so callers can write `error::Result<T>`.
pub type Result<T> = std::result::Result<T, RedfishError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_transport_errors_are_distinct() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let decode = RedfishError::decode("/redfish/v1/Chassis/1", source);
        assert!(decode.is_decode());
        assert!(!decode.is_transport());

        let http = RedfishError::Http {
            path: "/redfish/v1/Chassis/1".to_string(),
            status: 404,
            body: String::new(),
        };
        assert!(http.is_transport());
        assert!(!http.is_decode());
        assert!(http.to_string().contains("404"));
    }

    #[test]
    fn connect_error_names_endpoint_and_cause() {
        let err = RedfishError::Connect {
            endpoint: "https://10.0.0.5".to_string(),
            source: Box::new(RedfishError::Auth("no token".to_string())),
        };
        let text = err.to_string();
        assert!(text.contains("https://10.0.0.5"));
        assert!(text.contains("no token"));
    }
}
