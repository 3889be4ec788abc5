//! Product information scraped from a comic's page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub const PRICE: &str = "price";
pub const URL: &str = "url";
pub const TITLE: &str = "title";
pub const NAME: &str = "name";

pub const PRICE_UNAVAILABLE: &str = "Price unavailable";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_NAME: &str = "Unknown Comic";

/// Open attribute map describing one comic.
///
/// `price` and `url` are always present; every other key comes from the
/// retailer's page and is not known ahead of time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct ComicInfo {
    attributes: BTreeMap<String, String>,
}

impl ComicInfo {
    pub fn new(price: impl Into<String>, url: impl Into<String>) -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert(PRICE.to_string(), price.into());
        attributes.insert(URL.to_string(), url.into());
        Self { attributes }
    }

    pub fn price(&self) -> &str {
        self.get(PRICE).unwrap_or_default()
    }

    pub fn url(&self) -> &str {
        self.get(URL).unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, replacing any previous value under the same name.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("attribute name must not be empty"));
        }
        self.attributes.insert(name, value.into());
        Ok(())
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn into_attributes(self) -> BTreeMap<String, String> {
        self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for ComicInfo {
    type Error = DomainError;

    fn try_from(attributes: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        for required in [PRICE, URL] {
            if !attributes.contains_key(required) {
                return Err(DomainError::validation(format!(
                    "comic information is missing `{required}`"
                )));
            }
        }
        Ok(Self { attributes })
    }
}

impl From<ComicInfo> for BTreeMap<String, String> {
    fn from(info: ComicInfo) -> Self {
        info.attributes
    }
}
