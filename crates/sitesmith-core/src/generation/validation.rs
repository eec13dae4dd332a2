use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::bundle::{CanonicalFile, CodeBundle};

/// Reasons generated code is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is empty")]
    Blank(CanonicalFile),

    #[error("index.html must start with <!DOCTYPE html>")]
    MissingDoctype,

    #[error("{file} links to a separate page ({page}); only a single page is supported")]
    MultiPage { file: CanonicalFile, page: String },

    #[error("data.json is not valid JSON: {0}")]
    InvalidDataDocument(String),
}

fn multi_page_link() -> &'static Regex {
    static MULTI_PAGE: OnceLock<Regex> = OnceLock::new();
    MULTI_PAGE.get_or_init(|| {
        Regex::new(r"(?i)\b(about|contact|projects|login)\.html\b")
            .expect("multi-page pattern is valid")
    })
}

/// Structural checks applied to generated code before it is versioned.
pub fn validate_bundle(bundle: &CodeBundle) -> Result<(), ValidationError> {
    for kind in CanonicalFile::ALL {
        let content = bundle.get(kind);
        if content.trim().is_empty() {
            return Err(ValidationError::Blank(kind));
        }
        if let Some(page) = multi_page_link().find(content) {
            return Err(ValidationError::MultiPage {
                file: kind,
                page: page.as_str().to_string(),
            });
        }
    }

    let markup = bundle.markup.trim_start();
    let prefix = "<!DOCTYPE html";
    if !markup
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    {
        return Err(ValidationError::MissingDoctype);
    }

    serde_json::from_str::<serde_json::Value>(&bundle.data_document)
        .map_err(|e| ValidationError::InvalidDataDocument(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CodeBundle {
        CodeBundle::new(
            "<!DOCTYPE html><html><body><main></main></body></html>",
            "main { display: grid; }",
            "document.querySelector('main').textContent = 'hi';",
            r#"{"title":"Site"}"#,
        )
    }

    #[test]
    fn test_accepts_valid_bundle() {
        assert_eq!(validate_bundle(&valid()), Ok(()));
        let mut lower = valid();
        lower.markup = "\n  <!doctype html><p>x</p>".to_string();
        assert_eq!(validate_bundle(&lower), Ok(()));
    }

    #[test]
    fn test_rejects_missing_doctype() {
        let mut bundle = valid();
        bundle.markup = "<html><body></body></html>".to_string();
        assert_eq!(validate_bundle(&bundle), Err(ValidationError::MissingDoctype));
    }

    #[test]
    fn test_rejects_unparseable_data_document() {
        let mut bundle = valid();
        bundle.data_document = "{ title: Site }".to_string();
        assert!(matches!(
            validate_bundle(&bundle),
            Err(ValidationError::InvalidDataDocument(_))
        ));
    }

    #[test]
    fn test_rejects_blank_fields() {
        let mut bundle = valid();
        bundle.script = "  ".to_string();
        assert_eq!(
            validate_bundle(&bundle),
            Err(ValidationError::Blank(CanonicalFile::Script))
        );
    }

    #[test]
    fn test_rejects_multi_page_links() {
        let mut bundle = valid();
        bundle.script = "location.href = 'contact.html';".to_string();
        assert_eq!(
            validate_bundle(&bundle),
            Err(ValidationError::MultiPage {
                file: CanonicalFile::Script,
                page: "contact.html".to_string()
            })
        );
    }
}
