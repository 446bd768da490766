//! Core data types for postdesk.

use crate::codec::{DATE_FORMAT, derive_filename, is_canonical_date, slugify, trim_blank_lines};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One blog post as stored in the posts directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostRecord {
    /// Post title (required)
    pub title: String,

    /// Publication date, canonically `YYYY-MM-DD`
    pub date: String,

    /// Author display name (required)
    pub author: String,

    /// Categories in the order they were entered
    #[serde(default)]
    pub categories: Vec<String>,

    /// Short summary shown on index pages (required)
    pub excerpt: String,

    /// Markdown body without surrounding blank lines
    pub content: String,

    /// Name of the backing file, empty when decoded from bare text
    #[serde(default)]
    pub filename: String,
}

/// Validation errors for posts and drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    EmptyAuthor,
    EmptyExcerpt,
    EmptyDate,
    EmptyContent,
    NoCategories,
    InvalidDate(String),
    EmptySlug,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "title is required"),
            ValidationError::EmptyAuthor => write!(f, "author is required"),
            ValidationError::EmptyExcerpt => write!(f, "excerpt is required"),
            ValidationError::EmptyDate => write!(f, "date is required"),
            ValidationError::EmptyContent => write!(f, "content is required"),
            ValidationError::NoCategories => write!(f, "at least one category is required"),
            ValidationError::InvalidDate(date) => {
                write!(f, "invalid date '{}': expected YYYY-MM-DD", date)
            }
            ValidationError::EmptySlug => {
                write!(f, "title must contain at least one letter or digit")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl PostRecord {
    /// Validate the fields every stored post must have. The date must already
    /// be in canonical `YYYY-MM-DD` form.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if self.excerpt.trim().is_empty() {
            return Err(ValidationError::EmptyExcerpt);
        }
        if self.date.trim().is_empty() {
            return Err(ValidationError::EmptyDate);
        }
        if !is_canonical_date(&self.date) {
            return Err(ValidationError::InvalidDate(self.date.clone()));
        }
        Ok(())
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate(date.to_string()))
}

/// Split comma-separated category input, dropping empty entries.
pub fn parse_categories<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|entry| entry.as_ref().split(','))
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(String::from)
        .collect()
}

/// Unvalidated post input, as collected from a form or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub date: String,
    pub author: String,
    /// Raw entries; each may still hold several comma-separated categories
    pub categories: Vec<String>,
    pub excerpt: String,
    pub content: String,
}

impl PostDraft {
    /// Pre-fill a draft from an existing post for editing.
    pub fn from_record(record: &PostRecord) -> Self {
        Self {
            title: record.title.clone(),
            date: record.date.clone(),
            author: record.author.clone(),
            categories: record.categories.clone(),
            excerpt: record.excerpt.clone(),
            content: record.content.clone(),
        }
    }

    /// Validate the draft and turn it into a record with a derived filename.
    pub fn into_record(self) -> Result<PostRecord, ValidationError> {
        let title = self.title.trim().to_string();
        let author = self.author.trim().to_string();
        let excerpt = self.excerpt.trim().to_string();
        let date = self.date.trim().to_string();
        let content = trim_blank_lines(&self.content).to_string();
        let categories = parse_categories(&self.categories);

        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if author.is_empty() {
            return Err(ValidationError::EmptyAuthor);
        }
        if categories.is_empty() {
            return Err(ValidationError::NoCategories);
        }
        if excerpt.is_empty() {
            return Err(ValidationError::EmptyExcerpt);
        }
        if date.is_empty() {
            return Err(ValidationError::EmptyDate);
        }
        if content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }

        let date = parse_date(&date)?.format(DATE_FORMAT).to_string();
        if slugify(&title).is_empty() {
            return Err(ValidationError::EmptySlug);
        }

        let filename = derive_filename(&title, &date);
        Ok(PostRecord {
            title,
            date,
            author,
            categories,
            excerpt,
            content,
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(title: &str) -> PostRecord {
        PostRecord {
            title: title.to_string(),
            date: "2024-01-05".to_string(),
            author: "Ada".to_string(),
            categories: vec!["Tech".to_string()],
            excerpt: "Short".to_string(),
            content: "Body".to_string(),
            filename: String::new(),
        }
    }

    fn make_draft() -> PostDraft {
        PostDraft {
            title: "  Hello World ".to_string(),
            date: "2024-1-5".to_string(),
            author: " Ada ".to_string(),
            categories: vec!["Tech, Life".to_string(), " ,".to_string(), "Tech".to_string()],
            excerpt: "Short".to_string(),
            content: "\n\nBody\n\n".to_string(),
        }
    }

    #[test]
    fn test_record_validation_valid() {
        assert!(make_record("Valid title").validate().is_ok());
    }

    #[test]
    fn test_record_validation_empty_title() {
        assert_eq!(make_record("").validate(), Err(ValidationError::EmptyTitle));
        assert_eq!(make_record("   ").validate(), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_record_validation_missing_fields() {
        let mut record = make_record("Title");
        record.author.clear();
        assert_eq!(record.validate(), Err(ValidationError::EmptyAuthor));

        let mut record = make_record("Title");
        record.excerpt.clear();
        assert_eq!(record.validate(), Err(ValidationError::EmptyExcerpt));

        let mut record = make_record("Title");
        record.date.clear();
        assert_eq!(record.validate(), Err(ValidationError::EmptyDate));
    }

    #[test]
    fn test_record_validation_bad_date() {
        let mut record = make_record("Title");
        record.date = "yesterday".to_string();
        assert_eq!(
            record.validate(),
            Err(ValidationError::InvalidDate("yesterday".to_string()))
        );
    }

    #[test]
    fn test_record_validation_requires_canonical_date() {
        for date in ["2024-1-5", " 2024-01-05", "2024-01-05 ", "2024-02-30"] {
            let mut record = make_record("Title");
            record.date = date.to_string();
            assert_eq!(
                record.validate(),
                Err(ValidationError::InvalidDate(date.to_string())),
                "accepted {:?}",
                date
            );
        }
    }

    #[test]
    fn test_record_allows_empty_categories_and_content() {
        let mut record = make_record("Title");
        record.categories.clear();
        record.content.clear();
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_parse_categories() {
        let parsed = parse_categories(&["Tech, Life", "", " Tech ", "a,,b"]);
        assert_eq!(parsed, vec!["Tech", "Life", "Tech", "a", "b"]);
    }

    #[test]
    fn test_draft_into_record() {
        let record = make_draft().into_record().unwrap();
        assert_eq!(record.title, "Hello World");
        assert_eq!(record.date, "2024-01-05");
        assert_eq!(record.author, "Ada");
        assert_eq!(record.categories, vec!["Tech", "Life", "Tech"]);
        assert_eq!(record.content, "Body");
        assert_eq!(record.filename, "2024-01-05-hello-world.md");
    }

    #[test]
    fn test_draft_requires_every_field() {
        let mut draft = make_draft();
        draft.categories = vec![" , ".to_string()];
        assert_eq!(draft.into_record(), Err(ValidationError::NoCategories));

        let mut draft = make_draft();
        draft.content = "  \n ".to_string();
        assert_eq!(draft.into_record(), Err(ValidationError::EmptyContent));

        let mut draft = make_draft();
        draft.date = String::new();
        assert_eq!(draft.into_record(), Err(ValidationError::EmptyDate));
    }

    #[test]
    fn test_draft_rejects_bad_date() {
        let mut draft = make_draft();
        draft.date = "05/01/2024".to_string();
        assert_eq!(
            draft.into_record(),
            Err(ValidationError::InvalidDate("05/01/2024".to_string()))
        );
    }

    #[test]
    fn test_draft_rejects_title_without_slug() {
        let mut draft = make_draft();
        draft.title = "!!!".to_string();
        assert_eq!(draft.into_record(), Err(ValidationError::EmptySlug));
    }

    #[test]
    fn test_draft_from_record_roundtrip() {
        let mut record = make_record("Hello World");
        record.filename = "2024-01-05-hello-world.md".to_string();
        let again = PostDraft::from_record(&record).into_record().unwrap();
        assert_eq!(again, record);
    }

    #[test]
    fn test_record_serialization_roundtrip() {
        let record = make_record("Test post");
        let json = serde_json::to_string(&record).unwrap();
        let deserialized: PostRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, deserialized);
    }
}
