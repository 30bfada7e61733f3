use std::fmt;

use bspec_store::document::ID_FIELD;
use bspec_store::Document;
use serde_json::Value;

use crate::config::ValidationConfig;
use crate::error::{BSpecError, BSpecResult};

/// Outcome of validating one document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    /// The document's id, when one could be read.
    pub document_id: Option<String>,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    /// Returns `true` if no violation is an error. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.violations
            .iter()
            .all(|v| v.severity == Severity::Warning)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.document_id {
            write!(f, "{id}: ")?;
        }
        let descriptions: Vec<&str> = self
            .violations
            .iter()
            .map(|v| v.description.as_str())
            .collect();
        f.write_str(&descriptions.join("; "))
    }
}

/// A single rule the document broke.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Top-level member the rule concerns, empty for the document itself.
    pub field: String,
    pub kind: ViolationKind,
    pub severity: Severity,
    pub description: String,
}

impl Violation {
    pub(crate) fn error(field: &str, kind: ViolationKind, description: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            severity: Severity::Error,
            description: description.into(),
        }
    }

    pub(crate) fn warning(field: &str, kind: ViolationKind, description: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(field, kind, description)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    NotAnObject,
    MissingId,
    IdNotString,
    EmptyId,
    IdTooLong,
    IdFormat,
    TypeMismatch,
    InvalidVersion,
    EmptyTitle,
    InvalidTags,
    /// A `depends_on` entry names a document the archive does not hold.
    MissingDependency,
    /// An `enables` entry names a document the archive does not hold.
    MissingEnabledDocument,
    /// The document lies on a `depends_on` cycle.
    CircularDependency,
}

/// Schema gate applied before a document enters an archive.
#[derive(Clone, Debug, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check a decoded JSON value against every rule, collecting all
    /// violations.
    pub fn validate_value(&self, value: &Value) -> ValidationReport {
        let mut violations = Vec::new();
        let Value::Object(body) = value else {
            violations.push(violation(
                "",
                ViolationKind::NotAnObject,
                "document must be a JSON object",
            ));
            return ValidationReport {
                document_id: None,
                violations,
            };
        };

        let id = match body.get(ID_FIELD) {
            None => {
                violations.push(violation(ID_FIELD, ViolationKind::MissingId, "missing \"id\""));
                None
            }
            Some(Value::String(id)) => Some(id.as_str()),
            Some(_) => {
                violations.push(violation(
                    ID_FIELD,
                    ViolationKind::IdNotString,
                    "\"id\" must be a string",
                ));
                None
            }
        };

        if let Some(id) = id {
            if id.is_empty() {
                violations.push(violation(ID_FIELD, ViolationKind::EmptyId, "\"id\" is empty"));
            } else if let Some(limit) = self.config.max_id_length.filter(|&l| id.len() > l) {
                violations.push(violation(
                    ID_FIELD,
                    ViolationKind::IdTooLong,
                    &format!("\"id\" is {} bytes, limit is {limit}", id.len()),
                ));
            }
        }

        if self.config.strict {
            check_strict(body, id, &mut violations);
        }

        ValidationReport {
            document_id: id.map(str::to_string),
            violations,
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// Malformed JSON is a serialization error; schema failures carry the
    /// full [`ValidationReport`].
    pub fn validate_json(&self, json: &str) -> BSpecResult<Document> {
        let value: Value = serde_json::from_str(json)?;
        let report = self.validate_value(&value);
        if !report.is_valid() {
            tracing::warn!(
                id = report.document_id.as_deref().unwrap_or(""),
                violations = report.violations.len(),
                "document rejected"
            );
            return Err(BSpecError::Validation(report));
        }
        Ok(Document::from_value(value)?)
    }
}

/// Validate a JSON document with the default rules.
pub fn validate_document(json: &str) -> BSpecResult<Document> {
    Validator::default().validate_json(json)
}

fn violation(field: &str, kind: ViolationKind, description: &str) -> Violation {
    Violation::error(field, kind, description)
}

fn check_strict(
    body: &serde_json::Map<String, Value>,
    id: Option<&str>,
    violations: &mut Vec<Violation>,
) {
    let prefix = id.and_then(type_prefix);
    if let Some(id) = id {
        if !id.is_empty() && prefix.is_none() {
            violations.push(violation(
                ID_FIELD,
                ViolationKind::IdFormat,
                &format!("\"id\" {id:?} must look like TYPE-kebab-name"),
            ));
        }
    }

    match (body.get("type"), prefix) {
        (Some(Value::String(ty)), Some(prefix)) if ty != prefix => violations.push(violation(
            "type",
            ViolationKind::TypeMismatch,
            &format!("\"type\" {ty:?} does not match id prefix {prefix:?}"),
        )),
        (Some(Value::String(_)), _) | (None, _) => {}
        (Some(_), _) => violations.push(violation(
            "type",
            ViolationKind::TypeMismatch,
            "\"type\" must be a string",
        )),
    }

    if let Some(version) = body.get("version") {
        if !version.as_str().is_some_and(is_semver) {
            violations.push(violation(
                "version",
                ViolationKind::InvalidVersion,
                "\"version\" must be MAJOR.MINOR.PATCH",
            ));
        }
    }

    if let Some(title) = body.get("title") {
        if !title.as_str().is_some_and(|t| !t.trim().is_empty()) {
            violations.push(violation(
                "title",
                ViolationKind::EmptyTitle,
                "\"title\" must be a non-empty string",
            ));
        }
    }

    if let Some(tags) = body.get("tags") {
        let all_strings = tags
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !all_strings {
            violations.push(violation(
                "tags",
                ViolationKind::InvalidTags,
                "\"tags\" must be an array of strings",
            ));
        }
    }
}

/// The `TYPE` part of a `TYPE-kebab-name` id: three uppercase letters, a
/// dash, then lowercase letters, digits and dashes.
fn type_prefix(id: &str) -> Option<&str> {
    let (prefix, rest) = id.split_once('-')?;
    let prefix_ok = prefix.len() == 3 && prefix.bytes().all(|b| b.is_ascii_uppercase());
    let rest_ok = !rest.is_empty()
        && rest
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    (prefix_ok && rest_ok).then_some(prefix)
}

fn is_semver(s: &str) -> bool {
    let parts: Vec<&str> = s.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}
