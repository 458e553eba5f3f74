use core::fmt;

/// Errors that can occur during pointer resolution and reference handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A JSON Pointer leads to a part of the document that does not exist.
    PointerToNowhere { pointer: String },
    /// A JSON Pointer contains invalid percent-encoded data.
    InvalidPercentEncoding { pointer: String },
    /// A pointer token could not be used as an array index.
    InvalidArrayIndex { pointer: String, index: String },
    /// No schema in the document declares the requested `$anchor`.
    NoSuchAnchor { anchor: String },
    /// No schema in the document declares the requested `$id`.
    NoSuchId { id: String },
    /// A `$ref` value is syntactically malformed.
    MalformedRef {
        reference: String,
        suggestion: String,
    },
    /// A `$ref` points outside the document. External references are not
    /// fetched; the breakdown lets callers print actionable guidance.
    ExternalRef {
        reference: String,
        scheme: Option<String>,
        host: Option<String>,
        path: String,
    },
}

impl Error {
    pub(crate) fn pointer_to_nowhere(pointer: impl Into<String>) -> Error {
        Error::PointerToNowhere {
            pointer: pointer.into(),
        }
    }
    pub(crate) fn invalid_percent_encoding(pointer: impl Into<String>) -> Error {
        Error::InvalidPercentEncoding {
            pointer: pointer.into(),
        }
    }
    pub(crate) fn invalid_array_index(
        pointer: impl Into<String>,
        index: impl Into<String>,
    ) -> Error {
        Error::InvalidArrayIndex {
            pointer: pointer.into(),
            index: index.into(),
        }
    }
    pub(crate) fn no_such_anchor(anchor: impl Into<String>) -> Error {
        Error::NoSuchAnchor {
            anchor: anchor.into(),
        }
    }
    pub(crate) fn no_such_id(id: impl Into<String>) -> Error {
        Error::NoSuchId { id: id.into() }
    }
    pub(crate) fn malformed_ref(
        reference: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Error {
        Error::MalformedRef {
            reference: reference.into(),
            suggestion: suggestion.into(),
        }
    }
    pub(crate) fn external_ref(
        reference: impl Into<String>,
        scheme: Option<String>,
        host: Option<String>,
        path: impl Into<String>,
    ) -> Error {
        Error::ExternalRef {
            reference: reference.into(),
            scheme,
            host,
            path: path.into(),
        }
    }

    /// Guidance on how to fix the reference, when the error carries any.
    #[must_use]
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Error::MalformedRef { suggestion, .. } => Some(suggestion),
            Error::ExternalRef { .. } => {
                Some("external references are not supported; inline the referenced schema into the document")
            }
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PointerToNowhere { pointer } => {
                f.write_fmt(format_args!("Pointer '{pointer}' does not exist"))
            }
            Error::InvalidPercentEncoding { pointer } => f.write_fmt(format_args!(
                "Invalid percent encoding in pointer '{pointer}': the decoded bytes do not represent valid UTF-8"
            )),
            Error::InvalidArrayIndex { pointer, index } => f.write_fmt(format_args!(
                "Failed to use '{index}' as an array index in pointer '{pointer}'"
            )),
            Error::NoSuchAnchor { anchor } => {
                f.write_fmt(format_args!("Anchor '{anchor}' does not exist"))
            }
            Error::NoSuchId { id } => {
                f.write_fmt(format_args!("No schema with $id '{id}' exists"))
            }
            Error::MalformedRef {
                reference,
                suggestion,
            } => f.write_fmt(format_args!(
                "Reference '{reference}' is malformed: {suggestion}"
            )),
            Error::ExternalRef {
                reference,
                scheme,
                host,
                path,
            } => {
                f.write_fmt(format_args!("Reference '{reference}' is external"))?;
                if let Some(scheme) = scheme {
                    f.write_fmt(format_args!(" (scheme: {scheme}"))?;
                    if let Some(host) = host {
                        f.write_fmt(format_args!(", host: {host}"))?;
                    }
                    f.write_fmt(format_args!(", path: {path})"))?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {}
