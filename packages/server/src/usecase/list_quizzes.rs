//! UseCase: quiz catalog

use std::sync::Arc;

use crate::domain::{QuizStore, QuizSummary};

use super::error::ListQuizzesError;

pub struct ListQuizzesUseCase {
    quiz_store: Arc<dyn QuizStore>,
}

impl ListQuizzesUseCase {
    pub fn new(quiz_store: Arc<dyn QuizStore>) -> Self {
        Self { quiz_store }
    }

    pub async fn execute(&self) -> Result<Vec<QuizSummary>, ListQuizzesError> {
        self.quiz_store
            .list_quizzes()
            .await
            .map_err(|e| ListQuizzesError::QuizStoreUnavailable(e.to_string()))
    }
}
