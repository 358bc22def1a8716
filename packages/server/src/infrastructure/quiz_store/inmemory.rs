//! In-memory quiz store, optionally loaded from a JSON fixture file.
//!
//! File format (camelCase):
//!
//! ```json
//! [{"id": "Q1", "title": "Capitals", "questions": [
//!     {"text": "Capital of France?", "options": ["Lyon", "Paris"], "correctAnswer": 1}
//! ]}]
//! ```

use std::{collections::BTreeMap, path::Path};

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{
    OptionIndex, Question, Quiz, QuizId, QuizStore, QuizStoreError, QuizSummary,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizRecord {
    pub id: String,
    pub title: String,
    pub questions: Vec<QuestionRecord>,
}

impl TryFrom<QuizRecord> for Quiz {
    type Error = QuizStoreError;

    fn try_from(record: QuizRecord) -> Result<Self, Self::Error> {
        let id = QuizId::new(record.id.clone())
            .map_err(|e| QuizStoreError::LoadFailed(format!("quiz '{}': {}", record.id, e)))?;

        let mut questions = Vec::with_capacity(record.questions.len());
        for (number, question) in record.questions.into_iter().enumerate() {
            if question.correct_answer >= question.options.len() {
                return Err(QuizStoreError::LoadFailed(format!(
                    "quiz '{}' question {}: correct answer {} is out of range",
                    id,
                    number + 1,
                    question.correct_answer
                )));
            }
            questions.push(Question {
                text: question.text,
                options: question.options,
                correct_answer: OptionIndex::new(question.correct_answer),
            });
        }

        Ok(Quiz {
            id,
            title: record.title,
            questions,
        })
    }
}

/// Quizzes kept in memory, ordered by id
#[derive(Debug, Default)]
pub struct InMemoryQuizStore {
    quizzes: BTreeMap<QuizId, Quiz>,
}

impl InMemoryQuizStore {
    pub fn new(quizzes: Vec<Quiz>) -> Self {
        Self {
            quizzes: quizzes.into_iter().map(|q| (q.id.clone(), q)).collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, QuizStoreError> {
        let records: Vec<QuizRecord> =
            serde_json::from_str(json).map_err(|e| QuizStoreError::LoadFailed(e.to_string()))?;
        let quizzes = records
            .into_iter()
            .map(Quiz::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(quizzes))
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, QuizStoreError> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| QuizStoreError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        let store = Self::from_json(&json)?;
        tracing::info!("Loaded {} quizzes from {}", store.quizzes.len(), path.display());
        Ok(store)
    }
}

#[async_trait]
impl QuizStore for InMemoryQuizStore {
    async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Quiz, QuizStoreError> {
        self.quizzes
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| QuizStoreError::QuizNotFound(quiz_id.to_string()))
    }

    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, QuizStoreError> {
        Ok(self.quizzes.values().map(Quiz::summary).collect())
    }
}
