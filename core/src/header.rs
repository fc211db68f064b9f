//! Multi-valued header sets, used both to decorate outbound requests and to
//! assert on observed responses.
//!
//! # Design
//! The two uses deliberately differ. When attaching to a request every
//! value of every name goes out, in declaration order. When comparing
//! against a response only the first declared value of each name is checked
//! against the first observed value, and names the expectation does not
//! mention are ignored: an expectation is a subset assertion.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::Check;
use crate::http::HttpResponse;

/// Header name to ordered values. Names keep the spelling they were
/// declared with; lookups ignore ASCII case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: BTreeMap<String, Vec<String>>,
}

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Values for a name already present are appended.
    pub fn with<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.append(name, values);
        self
    }

    fn append<I, V>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let name = name.into();
        let key = self
            .fields
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name);
        self.fields
            .entry(key)
            .or_default()
            .extend(values.into_iter().map(Into::into));
    }

    /// Every value declared under `name`, case-insensitively.
    pub fn values(&self, name: &str) -> &[String] {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Flatten into `(name, value)` pairs for an outbound request, keeping
    /// every value.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .flat_map(|(k, vv)| vv.iter().map(move |v| (k.clone(), v.clone())))
            .collect()
    }

    /// Subset comparison against an observed response.
    ///
    /// Only the first value on each side is compared; a missing observed
    /// header reads as the empty string. A name declared with no values is
    /// compared against the empty string too.
    // TODO: decide whether multi-valued expectations should require every
    // declared value to be present, not just the first.
    pub fn compare(&self, observed: &HttpResponse) -> Vec<Check> {
        self.fields
            .iter()
            .filter_map(|(key, values)| {
                let want = values.first().map(String::as_str).unwrap_or("");
                let got = observed.header(key).unwrap_or("");
                (got != want).then(|| Check::Header {
                    key: key.clone(),
                    got: got.to_string(),
                    want: want.to_string(),
                })
            })
            .collect()
    }
}

impl<K, I, V> FromIterator<(K, I)> for Header
where
    K: Into<String>,
    I: IntoIterator<Item = V>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut header = Header::new();
        for (name, values) in iter {
            header.append(name, values);
        }
        header
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.fields)
    }
}
