//! Inbound request descriptor.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::form_urlencoded;

use crate::cache::CacheKey;
use crate::classifier::strip_separator;

/// Bytes left as-is when encoding a query component. Space is handled
/// separately and becomes `+`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b' ');

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT)
        .to_string()
        .replace(' ', "+")
}

/// Ordered query parameters, as received.
///
/// Encoding keeps insertion order; nothing is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter. A repeated name keeps its first position and its
    /// values are joined with a comma.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                existing.push(',');
                existing.push_str(&value);
            }
            None => self.0.push((name, value)),
        }
    }

    /// Parse a raw `application/x-www-form-urlencoded` query string.
    pub fn parse(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Encode in received order. Only alphanumerics and `_.-~` pass through
    /// unescaped and a space becomes `+`, so `*` is escaped and `~` is not.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.append(k, v);
        }
        params
    }
}

impl Serialize for QueryParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for QueryParams {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ParamsVisitor;

        impl<'de> Visitor<'de> for ParamsVisitor {
            type Value = QueryParams;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of query parameter names to string values, or null")
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(QueryParams::new())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(QueryParams::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut params = QueryParams::new();
                while let Some((k, v)) = access.next_entry::<String, String>()? {
                    params.append(k, v);
                }
                Ok(params)
            }
        }

        deserializer.deserialize_any(ParamsVisitor)
    }
}

fn default_raw_path() -> String {
    "/".to_string()
}

/// A request as handed over by the hosting runtime.
///
/// `raw_path` embeds the upstream domain, e.g.
/// `/openexchangerates.org/api/historical/2024-01-02.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyRequest {
    #[serde(rename = "rawPath", default = "default_raw_path")]
    pub raw_path: String,

    #[serde(rename = "queryStringParameters", default)]
    pub query_params: QueryParams,
}

impl Default for ProxyRequest {
    fn default() -> Self {
        Self {
            raw_path: default_raw_path(),
            query_params: QueryParams::new(),
        }
    }
}

impl ProxyRequest {
    pub fn new(raw_path: impl Into<String>, query_params: QueryParams) -> Self {
        Self {
            raw_path: raw_path.into(),
            query_params,
        }
    }

    /// Raw path plus `?` and the encoded query, or the raw path alone.
    pub fn full_path(&self) -> String {
        let query = self.query_params.encode();
        if query.is_empty() {
            self.raw_path.clone()
        } else {
            format!("{}?{}", self.raw_path, query)
        }
    }

    /// Cache key for this request.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::derive(&self.full_path())
    }

    /// Upstream URL: the full path, without its leading `/`, behind `scheme://`.
    pub fn upstream_url(&self, scheme: &str) -> String {
        format!("{}://{}", scheme, strip_separator(&self.full_path()))
    }
}
