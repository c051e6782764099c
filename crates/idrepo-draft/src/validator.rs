//! Required-field identity validation.

use crate::document::DocumentPath;
use crate::traits::IdentityValidator;
use crate::types::{FieldError, IdentityRequest, ValidationMode};
use serde_json::Value;

/// Checks that the identity is an object and, on create, that every
/// required path holds a non-null value
pub struct RequiredFieldsValidator {
    required: Vec<DocumentPath>,
}

impl RequiredFieldsValidator {
    pub fn new(required: Vec<DocumentPath>) -> Self {
        Self { required }
    }

    /// Build from dotted paths, skipping any that do not parse
    pub fn from_paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(paths.into_iter().filter_map(DocumentPath::parse).collect())
    }
}

impl IdentityValidator for RequiredFieldsValidator {
    fn validate(&self, request: &IdentityRequest, mode: ValidationMode) -> Vec<FieldError> {
        let identity = match &request.identity {
            Some(identity) if identity.is_object() => identity,
            Some(_) => return vec![FieldError::new("identity", "must be an object")],
            None => return vec![FieldError::new("identity", "missing identity")],
        };

        if mode == ValidationMode::Update {
            return Vec::new();
        }

        self.required
            .iter()
            .filter(|path| path.get(identity).map_or(true, Value::is_null))
            .map(|path| FieldError::new(path.to_string(), "required field missing"))
            .collect()
    }
}
