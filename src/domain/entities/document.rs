use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// A raw FAQ record as it comes out of a dataset, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFaqRecord {
    pub id: Option<String>,
    #[serde(alias = "instruction")]
    pub question: Option<String>,
    #[serde(alias = "response")]
    pub answer: Option<String>,
    pub category: Option<String>,
    /// Pre-combined embedding text, when the source already provides one.
    pub text: Option<String>,
}

impl RawFaqRecord {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqMetadata {
    pub question: String,
    pub answer: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub metadata: FaqMetadata,
}

impl Document {
    /// Builds a document from a raw record at position `index` in its dataset.
    ///
    /// The embedding text is the record's own `text` when it is non-blank,
    /// otherwise the question and answer joined by a newline. Question and answer
    /// are kept verbatim in the metadata.
    pub fn from_record(index: usize, record: RawFaqRecord) -> Result<Self, DomainError> {
        let question = non_blank(record.question)
            .ok_or_else(|| DomainError::malformed(index, "missing or empty question"))?;
        let answer = non_blank(record.answer)
            .ok_or_else(|| DomainError::malformed(index, "missing or empty answer"))?;

        let id = non_blank(record.id).unwrap_or_else(|| format!("faq-{index:04}"));
        let text = non_blank(record.text).unwrap_or_else(|| format!("{question}\n{answer}"));

        Ok(Self {
            id,
            text,
            metadata: FaqMetadata {
                question,
                answer,
                category: record.category.unwrap_or_default(),
            },
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// A stored document scored against a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
    /// Identifier of the embedding model that produced the stored vector.
    pub embedding_model: String,
}

/// Documents ranked by non-increasing similarity to a query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<SearchResult>,
}

impl RetrievalResult {
    /// Wraps hits that are already ranked.
    pub fn new(hits: Vec<SearchResult>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn top(&self) -> Option<&SearchResult> {
        self.hits.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SearchResult> {
        self.hits.iter()
    }

    pub fn hits(&self) -> &[SearchResult] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<SearchResult> {
        self.hits
    }

    /// Keeps only hits scoring at least `min_score`. Order is preserved.
    pub fn above(self, min_score: f32) -> Self {
        Self {
            hits: self
                .hits
                .into_iter()
                .filter(|h| h.score >= min_score)
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a SearchResult;
    type IntoIter = std::slice::Iter<'a, SearchResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
