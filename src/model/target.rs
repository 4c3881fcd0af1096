use crate::model::Origin;
use crate::ConfigError;
use std::fmt;
use url::Url;

/// Declarative description of which elements to extract text from
///
/// A selector matches every element named `tag_name`. When `class_name` is
/// set, the element must also carry that class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag_name: String,
    class_name: Option<String>,
}

impl Selector {
    /// Creates a validated selector
    ///
    /// An empty or missing class name means "any class". A class name holding
    /// several space-separated classes matches elements whose whole `class`
    /// attribute equals it.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSelector` if the tag name is empty or not a
    /// plain element name.
    pub fn new(tag_name: &str, class_name: Option<&str>) -> Result<Self, ConfigError> {
        let tag_name = tag_name.trim();
        validate_tag_name(tag_name)?;

        let class_name = class_name.map(str::trim).filter(|c| !c.is_empty());

        Ok(Self {
            tag_name: tag_name.to_ascii_lowercase(),
            class_name: class_name.map(str::to_string),
        })
    }

    /// Selector matching every element with the given tag
    pub fn tag(tag_name: &str) -> Result<Self, ConfigError> {
        Self::new(tag_name, None)
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.class_name {
            Some(class) => write!(f, "{}.{}", self.tag_name, class),
            None => write!(f, "{}", self.tag_name),
        }
    }
}

fn validate_tag_name(tag_name: &str) -> Result<(), ConfigError> {
    let mut chars = tag_name.chars();
    match chars.next() {
        None => Err(ConfigError::InvalidSelector(
            "tag name cannot be empty".to_string(),
        )),
        Some(first) if !first.is_ascii_alphabetic() => Err(ConfigError::InvalidSelector(
            format!("tag name '{}' must start with a letter", tag_name),
        )),
        Some(_) if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-') => {
            Err(ConfigError::InvalidSelector(format!(
                "tag name '{}' may only contain letters, digits and '-'",
                tag_name
            )))
        }
        Some(_) => Ok(()),
    }
}

/// A page to process together with what to extract from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    address: Url,
    selector: Selector,
    origin: Origin,
}

impl Target {
    /// Creates a target from a raw address
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the address does not parse, is not
    /// HTTP(S), or has no host.
    pub fn new(address: &str, selector: Selector) -> Result<Self, ConfigError> {
        let url = Url::parse(address.trim())
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", address, e)))?;
        Self::from_url(url, selector)
    }

    /// Creates a target from an already parsed URL
    pub fn from_url(address: Url, selector: Selector) -> Result<Self, ConfigError> {
        if address.scheme() != "http" && address.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "'{}' must use http or https",
                address
            )));
        }

        let origin = Origin::from_url(&address)
            .ok_or_else(|| ConfigError::InvalidUrl(format!("'{}' has no host", address)))?;

        Ok(Self {
            address,
            selector,
            origin,
        })
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}
