//! Rate limit key derivation.

/// Header checked first for the client address.
pub const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
/// Header checked when no forwarded-for header is present.
pub const REAL_IP_HEADER: &str = "x-real-ip";
/// Client id used when neither header is present. Every such client shares
/// one bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// A key that identifies one fixed-window bucket: a client on a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    /// Best-effort client identifier
    pub client_id: String,
    /// Requested resource path
    pub path: String,
}

impl RateLimitKey {
    /// Create a new key.
    pub fn new(client_id: &str, path: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            path: path.to_string(),
        }
    }
}

impl std::fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.client_id, self.path)
    }
}

/// Derive the client id from request headers.
///
/// Header names are matched case-insensitively. The value is taken verbatim,
/// so a forwarded-for chain such as `"1.2.3.4, 10.0.0.1"` is one client id.
pub fn client_id_from_headers<I, K, V>(headers: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut real_ip = None;

    for (name, value) in headers {
        let name = name.as_ref();
        if name.eq_ignore_ascii_case(FORWARDED_FOR_HEADER) {
            return value.as_ref().to_string();
        }
        if real_ip.is_none() && name.eq_ignore_ascii_case(REAL_IP_HEADER) {
            real_ip = Some(value.as_ref().to_string());
        }
    }

    real_ip.unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
