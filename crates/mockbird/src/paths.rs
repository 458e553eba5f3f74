//! Paths into schemas and validated instances.
use std::{fmt, fmt::Write, slice::Iter};

use referencing::pointer::unescape;

/// An owned JSON Pointer as a sequence of path chunks.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JsonPointer(Vec<PathChunk>);

impl JsonPointer {
    /// Parse a `#/…` or `/…` pointer string into chunks.
    ///
    /// Numeric tokens become [`PathChunk::Index`]; everything else becomes a
    /// property chunk after RFC 6901 unescaping.
    #[must_use]
    pub fn parse(pointer: &str) -> JsonPointer {
        let fragment = pointer.strip_prefix('#').unwrap_or(pointer);
        if fragment.is_empty() {
            return JsonPointer::default();
        }
        JsonPointer(
            fragment
                .split('/')
                .skip(1)
                .map(|token| match token.parse::<usize>() {
                    Ok(index) if !(token.len() > 1 && token.starts_with('0')) => {
                        PathChunk::Index(index)
                    }
                    _ => PathChunk::Property(unescape(token).into_owned().into_boxed_str()),
                })
                .collect(),
        )
    }

    /// A copy of this pointer with one more chunk appended.
    #[must_use]
    pub fn join(&self, chunk: impl Into<PathChunk>) -> JsonPointer {
        let mut joined = self.clone();
        joined.0.push(chunk.into());
        joined
    }

    /// Iterate over the chunks.
    pub fn iter(&self) -> Iter<'_, PathChunk> {
        self.0.iter()
    }

    /// The last chunk, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PathChunk> {
        self.0.last()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.0 {
            f.write_char('/')?;
            match chunk {
                PathChunk::Property(property) => {
                    for ch in property.chars() {
                        match ch {
                            '/' => f.write_str("~1")?,
                            '~' => f.write_str("~0")?,
                            _ => f.write_char(ch)?,
                        }
                    }
                }
                PathChunk::Index(index) => f.write_str(itoa::Buffer::new().format(*index))?,
                PathChunk::Keyword(keyword) => f.write_str(keyword)?,
            }
        }
        Ok(())
    }
}

impl serde::Serialize for JsonPointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A key within a JSON object, an index within a JSON array, or a schema
/// keyword segment.
///
/// Keeping indexes numeric avoids string conversion during validation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathChunk {
    /// Property name within a JSON object.
    Property(Box<str>),
    /// Index within a JSON array.
    Index(usize),
    /// JSON Schema keyword.
    Keyword(&'static str),
}

impl From<String> for PathChunk {
    #[inline]
    fn from(value: String) -> Self {
        PathChunk::Property(value.into_boxed_str())
    }
}

impl From<&'static str> for PathChunk {
    #[inline]
    fn from(value: &'static str) -> Self {
        PathChunk::Keyword(value)
    }
}

impl From<usize> for PathChunk {
    #[inline]
    fn from(value: usize) -> Self {
        PathChunk::Index(value)
    }
}

/// A borrowed path segment used while walking an instance.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SegmentRef<'a> {
    /// Property name within a JSON object.
    Property(&'a str),
    /// Index within a JSON array.
    Index(usize),
}

impl<'a> From<&'a str> for SegmentRef<'a> {
    #[inline]
    fn from(value: &'a str) -> SegmentRef<'a> {
        SegmentRef::Property(value)
    }
}

impl From<usize> for SegmentRef<'_> {
    #[inline]
    fn from(value: usize) -> Self {
        SegmentRef::Index(value)
    }
}

/// A node in a parent-linked list forming the instance path.
///
/// The validator pushes one node per descent on the stack, so building the
/// current instance location allocates nothing until an error materializes
/// it into a [`JsonPointer`].
#[derive(Debug, Clone, Copy)]
pub struct InstanceLocation<'a, 'b> {
    segment: Option<SegmentRef<'a>>,
    parent: Option<&'b InstanceLocation<'b, 'a>>,
}

impl Default for InstanceLocation<'_, '_> {
    fn default() -> Self {
        InstanceLocation::new()
    }
}

impl<'a, 'b> InstanceLocation<'a, 'b> {
    /// The root location.
    #[must_use]
    pub const fn new() -> Self {
        InstanceLocation {
            segment: None,
            parent: None,
        }
    }

    /// Extend the path with one segment.
    #[must_use]
    pub fn push(&'a self, segment: impl Into<SegmentRef<'a>>) -> Self {
        InstanceLocation {
            segment: Some(segment.into()),
            parent: Some(self),
        }
    }

    fn chunks(&self) -> Vec<PathChunk> {
        let mut chunks = Vec::new();
        let mut head = Some(self);
        while let Some(node) = head {
            if let Some(segment) = node.segment {
                chunks.push(match segment {
                    SegmentRef::Property(property) => PathChunk::Property(property.into()),
                    SegmentRef::Index(index) => PathChunk::Index(index),
                });
            }
            head = node.parent;
        }
        chunks.reverse();
        chunks
    }
}

impl From<&InstanceLocation<'_, '_>> for JsonPointer {
    #[inline]
    fn from(location: &InstanceLocation<'_, '_>) -> Self {
        JsonPointer(location.chunks())
    }
}

impl From<Vec<PathChunk>> for JsonPointer {
    #[inline]
    fn from(chunks: Vec<PathChunk>) -> Self {
        JsonPointer(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::{InstanceLocation, JsonPointer};
    use serde_json::json;

    #[test]
    fn display_escapes_tokens() {
        let pointer = JsonPointer::default().join("a/b".to_string()).join("c~d".to_string());
        assert_eq!(pointer.to_string(), "/a~1b/c~0d");
        let data = json!({"a/b": {"c~d": 1}});
        assert_eq!(data.pointer(&pointer.to_string()), Some(&json!(1)));
    }

    #[test]
    fn parse_round_trips() {
        let pointer = JsonPointer::parse("#/components/schemas/User");
        assert_eq!(pointer.to_string(), "/components/schemas/User");
        assert_eq!(JsonPointer::parse("#").to_string(), "");
        assert_eq!(JsonPointer::parse("#/items/0").to_string(), "/items/0");
    }

    #[test]
    fn instance_location_materializes_in_order() {
        let root = InstanceLocation::new();
        let outer = root.push("users");
        let inner = outer.push(3);
        let pointer = JsonPointer::from(&inner);
        assert_eq!(pointer.to_string(), "/users/3");
        assert_eq!(JsonPointer::from(&root).to_string(), "");
    }
}
