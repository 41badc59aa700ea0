//! Error taxonomy for host-reported failures.
//!
//! Positive response codes index a fixed table of error kinds; the codes
//! follow the host's exception table, ordered alphabetically by the
//! interpreter exception each kind represents. Unknown positive codes map
//! to [`Error::Runtime`] so that host protocol additions never break
//! dispatch.

use serde_json::{Map, Value as Json};

/// Alias for `Result<T, scriptbox_guest::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// A catchable failure surfaced to sandboxed script code.
///
/// Three kinds carry structured detail rather than a plain message:
/// [`Error::NotFound`], [`Error::Io`], and [`Error::Syntax`]. For those,
/// the host may send `data` as either a plain string or a record; absent
/// optional fields become `None`, never a dispatch failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A named resource (module, page, message) could not be located.
    #[error("not found: {message}")]
    NotFound {
        /// Human-readable description.
        message: String,
        /// Name of the missing resource, when the host reports it.
        name: Option<String>,
        /// Search path that was consulted, when the host reports it.
        path: Option<String>,
    },

    /// A sequence index was out of range.
    #[error("no such index: {0}")]
    Index(String),

    /// A mapping key was absent.
    #[error("no such key: {0}")]
    Key(String),

    /// The host ran out of memory servicing the call.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// The requested operation is not implemented by this host.
    #[error("not implemented: {0}")]
    Unimplemented(String),

    /// A host-side I/O operation failed.
    #[error("I/O error (errno {errno}): {message}")]
    Io {
        /// POSIX errno reported by the host.
        errno: i32,
        /// strerror-style description.
        message: String,
        /// Primary path involved, when the host reports it.
        path: Option<String>,
        /// Secondary path (e.g. rename target), when the host reports it.
        path2: Option<String>,
    },

    /// An arithmetic result was too large to represent.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),

    /// Generic runtime failure; also the fallback for unknown codes.
    #[error("runtime error: {0}")]
    Runtime(String),

    /// Asynchronous iteration is exhausted.
    #[error("no more items (async): {0}")]
    StopAsync(String),

    /// Iteration is exhausted.
    #[error("no more items: {0}")]
    Stop(String),

    /// Input text failed to parse.
    #[error("syntax error: {message}")]
    Syntax {
        /// Human-readable description.
        message: String,
        /// Name of the offending source, when the host reports it.
        /// (Not named `source` — thiserror reserves that for error chaining.)
        source_name: Option<String>,
        /// One-based line of the error, when the host reports it.
        line: Option<u64>,
        /// Column within the line, when the host reports it.
        column: Option<u64>,
        /// The offending text itself, when the host reports it.
        text: Option<String>,
    },

    /// A value had the wrong type for the operation.
    #[error("type mismatch: {0}")]
    Type(String),

    /// A value had the right type but an unacceptable value.
    #[error("invalid value: {0}")]
    Value(String),

    /// Division or modulo by zero.
    #[error("division by zero: {0}")]
    DivideByZero(String),
}

impl Error {
    /// Selects an error kind for a positive host response code.
    ///
    /// Total over all integers: any code outside the defined table yields
    /// [`Error::Runtime`] carrying the stringified data.
    pub fn from_code(code: i64, data: &Json) -> Self {
        match code {
            1 => match data.as_object() {
                Some(rec) => Self::NotFound {
                    message: field_str(rec, "message").unwrap_or_default(),
                    name: field_str(rec, "name"),
                    path: field_str(rec, "path"),
                },
                None => Self::NotFound {
                    message: text(data),
                    name: None,
                    path: None,
                },
            },
            2 => Self::Index(text(data)),
            3 => Self::Key(text(data)),
            4 => Self::OutOfMemory(text(data)),
            5 => Self::Unimplemented(text(data)),
            6 => {
                let errno = data
                    .as_object()
                    .and_then(|rec| field_i64(rec, "errno"))
                    .and_then(|n| i32::try_from(n).ok())
                    .unwrap_or(0);
                Self::from_errno(errno, data)
            }
            7 => Self::Overflow(text(data)),
            8 => Self::Runtime(text(data)),
            9 => Self::StopAsync(text(data)),
            10 => Self::Stop(text(data)),
            11 => match data.as_object() {
                Some(rec) => Self::Syntax {
                    message: field_str(rec, "message").unwrap_or_default(),
                    source_name: field_str(rec, "source"),
                    line: field_u64(rec, "line"),
                    column: field_u64(rec, "column"),
                    text: field_str(rec, "text"),
                },
                None => Self::Syntax {
                    message: text(data),
                    source_name: None,
                    line: None,
                    column: None,
                    text: None,
                },
            },
            12 => Self::Type(text(data)),
            13 => Self::Value(text(data)),
            14 => Self::DivideByZero(text(data)),
            _ => Self::Runtime(text(data)),
        }
    }

    /// Builds an [`Error::Io`] from a raw syscall failure.
    ///
    /// `data` may be a plain message or a structured record with
    /// `strerror`/`message`, `filename`, and `filename2` fields; the
    /// record shape comes from newer host revisions, the plain string from
    /// older ones. Both are supported.
    pub fn from_errno(errno: i32, data: &Json) -> Self {
        match data.as_object() {
            Some(rec) => Self::Io {
                errno,
                message: field_str(rec, "strerror")
                    .or_else(|| field_str(rec, "message"))
                    .unwrap_or_default(),
                path: field_str(rec, "filename"),
                path2: field_str(rec, "filename2"),
            },
            None => Self::Io {
                errno,
                message: text(data),
                path: None,
                path2: None,
            },
        }
    }
}

/// Renders error `data` as a message string.
///
/// Strings pass through unquoted; null becomes empty; anything else keeps
/// its JSON rendering so no detail is silently dropped.
fn text(data: &Json) -> String {
    match data {
        Json::String(s) => s.clone(),
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

/// Optional string field of a structured error record.
fn field_str(rec: &Map<String, Json>, key: &str) -> Option<String> {
    rec.get(key).and_then(Json::as_str).map(str::to_owned)
}

/// Optional integer field of a structured error record.
fn field_i64(rec: &Map<String, Json>, key: &str) -> Option<i64> {
    rec.get(key).and_then(Json::as_i64)
}

/// Optional unsigned field of a structured error record.
fn field_u64(rec: &Map<String, Json>, key: &str) -> Option<u64> {
    rec.get(key).and_then(Json::as_u64)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn every_defined_code_has_a_kind() {
        let msg = json!("detail");
        for code in 1..=14 {
            let err = Error::from_code(code, &msg);
            // The fallback kind is reserved for code 8 and unknowns.
            if code != 8 {
                assert!(
                    !matches!(err, Error::Runtime(_)),
                    "code {code} fell through to Runtime"
                );
            }
        }
        assert!(matches!(Error::from_code(8, &msg), Error::Runtime(_)));
    }

    #[test]
    fn unknown_codes_fall_back_to_runtime() {
        for code in [15, 42, 1000, i64::MAX] {
            assert!(matches!(
                Error::from_code(code, &json!("boom")),
                Error::Runtime(msg) if msg == "boom"
            ));
        }
    }

    #[test]
    fn missing_key_keeps_its_message() {
        let err = Error::from_code(3, &json!("no such key"));
        assert_eq!(err, Error::Key("no such key".to_owned()));
    }

    #[test]
    fn not_found_from_record_and_from_string() {
        let err = Error::from_code(
            1,
            &json!({"message": "module not found", "name": "mw.fake", "path": "Module:"}),
        );
        assert_eq!(
            err,
            Error::NotFound {
                message: "module not found".to_owned(),
                name: Some("mw.fake".to_owned()),
                path: Some("Module:".to_owned()),
            }
        );

        let err = Error::from_code(1, &json!("gone"));
        assert_eq!(
            err,
            Error::NotFound {
                message: "gone".to_owned(),
                name: None,
                path: None,
            }
        );
    }

    #[test]
    fn structured_kinds_tolerate_missing_fields() {
        // A record carrying only part of the schema must not fail.
        let err = Error::from_code(11, &json!({"message": "bad input", "line": 3}));
        assert_eq!(
            err,
            Error::Syntax {
                message: "bad input".to_owned(),
                source_name: None,
                line: Some(3),
                column: None,
                text: None,
            }
        );

        let err = Error::from_code(6, &json!({}));
        assert_eq!(
            err,
            Error::Io {
                errno: 0,
                message: String::new(),
                path: None,
                path2: None,
            }
        );
    }

    #[test]
    fn syntax_record_reads_the_source_field() {
        // The wire key stays "source" even though the local field cannot
        // use that name.
        let err = Error::from_code(
            11,
            &json!({"message": "unexpected '}'", "source": "Module:Infobox", "line": 12, "column": 7, "text": "}}"}),
        );
        assert_eq!(
            err,
            Error::Syntax {
                message: "unexpected '}'".to_owned(),
                source_name: Some("Module:Infobox".to_owned()),
                line: Some(12),
                column: Some(7),
                text: Some("}}".to_owned()),
            }
        );
        assert_eq!(err.to_string(), "syntax error: unexpected '}'");
    }

    #[test]
    fn io_record_reads_errno_and_paths() {
        let err = Error::from_code(
            6,
            &json!({"errno": 2, "strerror": "No such file or directory", "filename": "/tmp/x"}),
        );
        assert_eq!(
            err,
            Error::Io {
                errno: 2,
                message: "No such file or directory".to_owned(),
                path: Some("/tmp/x".to_owned()),
                path2: None,
            }
        );
    }

    #[test]
    fn from_errno_supports_both_shapes() {
        let err = Error::from_errno(2, &json!("No such file or directory"));
        assert_eq!(
            err,
            Error::Io {
                errno: 2,
                message: "No such file or directory".to_owned(),
                path: None,
                path2: None,
            }
        );

        let err = Error::from_errno(
            13,
            &json!({"message": "Permission denied", "filename": "/etc/shadow", "filename2": null}),
        );
        assert_eq!(
            err,
            Error::Io {
                errno: 13,
                message: "Permission denied".to_owned(),
                path: Some("/etc/shadow".to_owned()),
                path2: None,
            }
        );
    }

    #[test]
    fn non_string_data_keeps_its_json_rendering() {
        assert!(matches!(
            Error::from_code(13, &json!({"got": 7})),
            Error::Value(msg) if msg == r#"{"got":7}"#
        ));
        assert!(matches!(
            Error::from_code(12, &Json::Null),
            Error::Type(msg) if msg.is_empty()
        ));
    }
}
