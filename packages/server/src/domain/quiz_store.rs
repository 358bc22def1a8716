//! Read-only access to quiz content.

use async_trait::async_trait;

use super::{Quiz, QuizId, QuizStoreError, QuizSummary};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizStore: Send + Sync {
    async fn find_quiz(&self, quiz_id: &QuizId) -> Result<Quiz, QuizStoreError>;

    /// Catalog of every quiz, ordered by id
    async fn list_quizzes(&self) -> Result<Vec<QuizSummary>, QuizStoreError>;
}
