//! Naming of the service keys used to bridge managed-service credentials.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CopyError;

/// Longest service key name a control plane accepts.
pub const MAX_KEY_NAME_LEN: usize = 255;

/// Deterministic name format for bridge service keys.
///
/// The format carries exactly one `{service}` placeholder. `{org}` and
/// `{space}` may also appear and are bound to the destination identity with
/// [`KeyNameTemplate::bind_destination`], so copies to different destinations
/// use different keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyNameTemplate {
    format: String,
}

impl KeyNameTemplate {
    pub const SERVICE: &'static str = "{service}";
    pub const ORG: &'static str = "{org}";
    pub const SPACE: &'static str = "{space}";

    pub fn parse(format: &str) -> Result<Self, CopyError> {
        let count = format.matches(Self::SERVICE).count();
        if count != 1 {
            return Err(CopyError::InvalidKeyTemplate {
                format: format.to_string(),
                reason: format!("expected exactly one {} placeholder, found {count}", Self::SERVICE),
            });
        }
        Ok(Self {
            format: format.to_string(),
        })
    }

    /// Substitutes the destination org and space names.
    ///
    /// Fails if a substituted name itself contains `{service}`, since the
    /// bound format must still carry exactly one placeholder.
    pub fn bind_destination(&self, org: &str, space: &str) -> Result<Self, CopyError> {
        Self::parse(&self.format.replace(Self::ORG, org).replace(Self::SPACE, space))
    }

    /// Renders the key name for one service, cut to [`MAX_KEY_NAME_LEN`] bytes.
    pub fn render(&self, service_name: &str) -> String {
        let mut name = self.format.replace(Self::SERVICE, service_name);
        if name.len() > MAX_KEY_NAME_LEN {
            let mut end = MAX_KEY_NAME_LEN;
            while !name.is_char_boundary(end) {
                end -= 1;
            }
            name.truncate(end);
        }
        name
    }

    pub fn as_str(&self) -> &str {
        &self.format
    }

    /// Fails if two distinct service names render to the same key name, which
    /// happens when long names are truncated.
    pub fn check_unique<'a, I>(&self, service_names: I) -> Result<(), CopyError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for name in service_names {
            let key_name = self.render(name);
            match seen.get(&key_name) {
                Some(first) if *first != name => {
                    return Err(CopyError::KeyNameCollision {
                        key_name,
                        first: (*first).to_string(),
                        second: name.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    seen.insert(key_name, name);
                }
            }
        }
        Ok(())
    }
}

impl FromStr for KeyNameTemplate {
    type Err = CopyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for KeyNameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format)
    }
}
