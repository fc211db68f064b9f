//! `multipart/form-data` bodies with a fixed boundary.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::body::Body;
use crate::error::EncodeError;

macro_rules! boundary {
    () => {
        "testboundary"
    };
}

/// Boundary separating parts. Fixed so encoded bodies are reproducible.
pub const BOUNDARY: &str = boundary!();

const MULTIPART_FORM_DATA: &str = concat!("multipart/form-data; boundary=", boundary!());

/// A file attachment inside a multipart body.
#[derive(Clone, PartialEq, Eq)]
pub struct File {
    pub content_type: String,
    pub name: String,
    pub contents: Vec<u8>,
}

impl File {
    pub fn new(
        content_type: impl Into<String>,
        name: impl Into<String>,
        contents: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            name: name.into(),
            contents: contents.into(),
        }
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("content_type", &self.content_type)
            .field("name", &self.name)
            .field("contents", &String::from_utf8_lossy(&self.contents))
            .finish()
    }
}

/// One value of a multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    File(File),
}

impl From<&str> for Part {
    fn from(s: &str) -> Self {
        Part::Text(s.to_string())
    }
}

impl From<String> for Part {
    fn from(s: String) -> Self {
        Part::Text(s)
    }
}

impl From<File> for Part {
    fn from(file: File) -> Self {
        Part::File(file)
    }
}

/// Converts a dynamic JSON value found under `key`. Strings become text
/// parts and `{"type", "name", "contents"}` objects become files.
impl TryFrom<(&str, Value)> for Part {
    type Error = EncodeError;

    fn try_from((key, value): (&str, Value)) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Ok(Part::Text(s)),
            Value::Object(ref map) => {
                let field = |name: &str| map.get(name).and_then(Value::as_str);
                match (field("type"), field("name"), field("contents")) {
                    (Some(content_type), Some(name), Some(contents)) if map.len() == 3 => {
                        Ok(Part::File(File::new(content_type, name, contents)))
                    }
                    _ => Err(unsupported(key, &value)),
                }
            }
            other => Err(unsupported(key, &other)),
        }
    }
}

fn unsupported(key: &str, value: &Value) -> EncodeError {
    EncodeError::UnsupportedPart {
        key: key.to_string(),
        kind: kind_of(value),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field name to an ordered sequence of parts. A field with several parts
/// is written as that many parts sharing the same name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    fields: BTreeMap<String, Vec<Part>>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, P>(mut self, name: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Part>,
    {
        self.fields
            .entry(name.into())
            .or_default()
            .extend(parts.into_iter().map(Into::into));
        self
    }

    /// Build from a JSON object whose values are parts or arrays of parts.
    pub fn from_json(value: Value) -> Result<Self, EncodeError> {
        let Value::Object(map) = value else {
            return Err(unsupported("", &value));
        };
        let mut body = MultipartBody::new();
        for (key, value) in map {
            let values = match value {
                Value::Array(values) => values,
                single => vec![single],
            };
            let parts = values
                .into_iter()
                .map(|v| Part::try_from((key.as_str(), v)))
                .collect::<Result<Vec<_>, _>>()?;
            body = body.with(key, parts);
        }
        Ok(body)
    }
}

impl fmt::Display for MultipartBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.fields)
    }
}

impl Body for MultipartBody {
    fn content_type(&self) -> &str {
        MULTIPART_FORM_DATA
    }

    fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let mut writer = PartWriter::default();
        for (name, parts) in &self.fields {
            for part in parts {
                match part {
                    Part::Text(value) => {
                        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
                        writer.write_part(&disposition, None, value.as_bytes());
                    }
                    Part::File(file) => {
                        let disposition = format!(
                            "form-data; name=\"{}\"; filename=\"{}\"",
                            escape_quotes(name),
                            escape_quotes(&file.name)
                        );
                        writer.write_part(&disposition, Some(&file.content_type), &file.contents);
                    }
                }
            }
        }
        Ok(writer.finish())
    }
}

#[derive(Default)]
struct PartWriter {
    buf: Vec<u8>,
    started: bool,
}

impl PartWriter {
    fn write_part(&mut self, disposition: &str, content_type: Option<&str>, contents: &[u8]) {
        if self.started {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.started = true;
        self.buf.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        self.buf
            .extend_from_slice(format!("Content-Disposition: {disposition}\r\n").as_bytes());
        if let Some(content_type) = content_type {
            self.buf
                .extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        self.buf.extend_from_slice(b"\r\n");
        self.buf.extend_from_slice(contents);
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf
            .extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        self.buf
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
