//! Validation of externally submitted analysis records.
//!
//! A submission carries an already analysed comment (text, category, tags).
//! Invalid submissions are client errors and never reach the pipeline.

use serde::Deserialize;
use serde_json::Value;

use crate::{Category, Comment, NewRecord, SubmissionError};

/// Inbound submission as received on the wire.
///
/// Every field is optional here so that all missing fields can be reported at
/// once by [`SubmissionRequest::validate`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionRequest {
    /// Comment text.
    #[serde(default)]
    pub comentario: Option<Value>,
    /// Category label.
    #[serde(default)]
    pub categoria: Option<Value>,
    /// List of tags.
    #[serde(default)]
    pub tags: Option<Value>,
}

impl SubmissionRequest {
    /// Checks the submission and converts it into a [`NewRecord`].
    ///
    /// The category must be exactly one of the valid labels; no lenient
    /// matching is applied to client input.
    pub fn validate(self) -> Result<NewRecord, SubmissionError> {
        let mut missing = Vec::new();
        if self.comentario.is_none() {
            missing.push("comentario");
        }
        if self.categoria.is_none() {
            missing.push("categoria");
        }
        if self.tags.is_none() {
            missing.push("tags");
        }
        let (Some(comentario), Some(categoria), Some(tags)) =
            (self.comentario, self.categoria, self.tags)
        else {
            return Err(SubmissionError::MissingFields(missing));
        };

        let text = comentario
            .as_str()
            .ok_or(SubmissionError::NotText("comentario"))?;
        let comment = Comment::new(text).ok_or(SubmissionError::EmptyComment)?;

        let label = categoria
            .as_str()
            .ok_or(SubmissionError::NotText("categoria"))?
            .trim();
        let category =
            Category::from_label(label).ok_or_else(|| SubmissionError::InvalidCategory {
                given: label.to_string(),
                valid: Category::accepted_labels(),
            })?;

        let tags = match tags {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    _ => Err(SubmissionError::InvalidTags),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(SubmissionError::InvalidTags),
        };

        Ok(NewRecord {
            comment,
            category,
            tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: Value) -> SubmissionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_submission_is_trimmed() {
        let record = request(json!({
            "comentario": "  la cafetería es cara ",
            "categoria": " Opinion ",
            "tags": ["cafetería"]
        }))
        .validate()
        .unwrap();
        assert_eq!(record.comment.as_str(), "la cafetería es cara");
        assert_eq!(record.category, Category::Opinion);
        assert_eq!(record.tags, vec!["cafetería"]);
    }

    #[test]
    fn test_all_missing_fields_reported() {
        let err = request(json!({ "categoria": "Opinion" })).validate().unwrap_err();
        assert_eq!(err, SubmissionError::MissingFields(vec!["comentario", "tags"]));
    }

    #[test]
    fn test_blank_comment_rejected() {
        let err = request(json!({ "comentario": "   ", "categoria": "Opinion", "tags": [] }))
            .validate()
            .unwrap_err();
        assert_eq!(err, SubmissionError::EmptyComment);
    }

    #[test]
    fn test_unknown_category_rejected_without_lenient_matching() {
        let err = request(json!({
            "comentario": "hola a todos",
            "categoria": "opinion",
            "tags": []
        }))
        .validate()
        .unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::InvalidCategory { ref given, .. } if given == "opinion"
        ));
    }

    #[test]
    fn test_legacy_alias_accepted() {
        let record = request(json!({
            "comentario": "el maestro es malo",
            "categoria": "Queja",
            "tags": ["maestro"]
        }))
        .validate()
        .unwrap();
        assert_eq!(record.category, Category::HateSpeech);
    }

    #[test]
    fn test_tags_must_be_list_of_strings() {
        let not_list = request(json!({
            "comentario": "hola a todos",
            "categoria": "Opinion",
            "tags": "x"
        }));
        assert_eq!(not_list.validate().unwrap_err(), SubmissionError::InvalidTags);
        let mixed = request(json!({
            "comentario": "hola a todos",
            "categoria": "Opinion",
            "tags": ["a", 1]
        }));
        assert_eq!(mixed.validate().unwrap_err(), SubmissionError::InvalidTags);
    }

    #[test]
    fn test_non_text_comment_rejected() {
        let err = request(json!({ "comentario": 5, "categoria": "Opinion", "tags": [] }))
            .validate()
            .unwrap_err();
        assert_eq!(err, SubmissionError::NotText("comentario"));
    }
}
