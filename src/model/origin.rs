use std::fmt;
use url::Url;

/// The scheme + host (+ explicit port) of an address
///
/// Origins are the unit at which robots.txt is resolved and cached. The port
/// is kept only when it differs from the scheme's default, so
/// `https://example.com:443/` and `https://example.com/` share an origin.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl Origin {
    /// Derives the origin of a URL
    ///
    /// Returns `None` for URLs without a host (e.g. `data:` or `mailto:`).
    ///
    /// # Examples
    ///
    /// ```
    /// use url::Url;
    /// use sumi_glean::model::Origin;
    ///
    /// let url = Url::parse("https://EXAMPLE.com/path?q=1").unwrap();
    /// let origin = Origin::from_url(&url).unwrap();
    /// assert_eq!(origin.to_string(), "https://example.com");
    /// ```
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = url.host_str()?.to_lowercase();
        Some(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the address of this origin's robots.txt
    pub fn robots_url(&self) -> Option<Url> {
        Url::parse(&format!("{}/robots.txt", self)).ok()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}://{}:{}", self.scheme, self.host, port),
            None => write!(f, "{}://{}", self.scheme, self.host),
        }
    }
}
