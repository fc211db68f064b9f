//! Body payloads: JSON, URL-encoded form, and multipart form.
//!
//! # Design
//! Every payload variant implements `Body`, which publishes a content type
//! and encodes to bytes. Encoding is deterministic: JSON object keys and
//! form keys come out sorted, and multipart bodies use a fixed boundary, so
//! an expected body can be written down as a literal and diffed byte for
//! byte.
//!
//! Only `JsonBody` can also act as a response expectation; see
//! `JsonBody::compare`.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::error::{Check, EncodeError, Side};

pub use crate::multipart::{File, MultipartBody, Part, BOUNDARY};

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// A request payload that can be serialized onto the wire.
pub trait Body: fmt::Debug + fmt::Display + Send + Sync {
    /// Value for the outbound `Content-Type` header.
    fn content_type(&self) -> &str;

    fn encode(&self) -> Result<Vec<u8>, EncodeError>;
}

/// A JSON document. Objects encode with their keys sorted and numbers keep
/// the exact digits they were written with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonBody(Value);

impl JsonBody {
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// Compare an observed body against this expectation.
    ///
    /// Both sides are decoded into generic JSON values and compared
    /// structurally, so key order and whitespace do not matter. An empty
    /// body decodes to an empty object. Anything after the first JSON value
    /// in the stream is ignored.
    pub fn compare(&self, observed: &[u8]) -> Option<Check> {
        let got = match decode(observed) {
            Ok(v) => v,
            Err(reason) => {
                return Some(Check::Decode {
                    side: Side::Observed,
                    reason,
                })
            }
        };
        let want = match self.encode().map_err(|e| e.to_string()).and_then(|b| decode(&b)) {
            Ok(v) => v,
            Err(reason) => {
                return Some(Check::Decode {
                    side: Side::Expected,
                    reason,
                })
            }
        };
        (got != want).then(|| Check::Body {
            got: got.to_string(),
            want: want.to_string(),
        })
    }
}

fn decode(bytes: &[u8]) -> Result<Value, String> {
    match serde_json::Deserializer::from_slice(bytes)
        .into_iter::<Value>()
        .next()
    {
        None => Ok(Value::Object(Map::new())),
        Some(result) => result.map_err(|e| e.to_string()),
    }
}

impl From<Value> for JsonBody {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<Map<String, Value>> for JsonBody {
    fn from(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }
}

impl fmt::Display for JsonBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Body for JsonBody {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        serde_json::to_vec(&self.0).map_err(|e| EncodeError::Serialize {
            variant: "JsonBody",
            payload: self.to_string(),
            reason: e.to_string(),
        })
    }
}

/// An `application/x-www-form-urlencoded` body. Keys encode sorted, values
/// of one key in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.fields
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }
}

impl<K, I, V> FromIterator<(K, I)> for FormBody
where
    K: Into<String>,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(FormBody::new(), |form, (key, values)| form.with(key, values))
    }
}

impl fmt::Display for FormBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.fields)
    }
}

impl Body for FormBody {
    fn content_type(&self) -> &str {
        FORM_URLENCODED
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, values) in &self.fields {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        Ok(serializer.finish().into_bytes())
    }
}
