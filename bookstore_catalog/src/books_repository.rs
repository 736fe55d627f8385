pub use in_memory_books_repository::InMemoryBookRepository;
pub use mongo_books_repository::{MongoBooksRepository, MongoBooksRepositoryConfig};

use crate::api::{BookId, BookModel};
use crate::book_document::BookDocument;
use crate::book_filter::BookFilter;

mod in_memory_books_repository;
mod mongo_books_repository;

#[derive(thiserror::Error, Debug)]
pub enum BookRepositoryError {
    #[error("Book {0} not found")]
    NotFound(BookId),

    #[error("DatabaseFailure failure {0}")]
    DatabaseFailure(#[from] mongodb::error::Error),

    #[error("Other error {0}")]
    Other(String),
}

/// Counts reported by the store after an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Number of books with the requested id
    pub matched: u64,
    /// Number of books whose fields actually changed
    pub modified: u64,
}

#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// Adds book to repository, returns an id assigned to the book by the store
    async fn add_book(&self, book: BookModel) -> Result<BookId, BookRepositoryError>;
    /// Lists books matching the filter in store order, without their ids
    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<BookModel>, BookRepositoryError>;
    /// Retrieves the book with its id, fails with NotFound if there is no such book
    async fn get_book(&self, book_id: BookId) -> Result<BookDocument, BookRepositoryError>;
    /// Replaces all fields of the book, the id stays untouched
    async fn update_book(
        &self,
        book_id: BookId,
        book: BookModel,
    ) -> Result<UpdateOutcome, BookRepositoryError>;
}
