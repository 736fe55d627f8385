use crate::api::{BookId, BookModel};
use crate::book_document::BookDocument;
use crate::book_filter::BookFilter;
use crate::books_repository::{BookRepository, BookRepositoryError, UpdateOutcome};

/// Keeps books in insertion order, which is the order listing returns them in
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: parking_lot::RwLock<Vec<(BookId, BookModel)>>,
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn add_book(&self, book: BookModel) -> Result<BookId, BookRepositoryError> {
        let id = BookId::generate();
        self.books.write().push((id, book));
        Ok(id)
    }

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<BookModel>, BookRepositoryError> {
        Ok(self
            .books
            .read()
            .iter()
            .filter(|(book_id, book)| filter.matches(book_id, book))
            .map(|(_, book)| book.clone())
            .collect())
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDocument, BookRepositoryError> {
        self.books
            .read()
            .iter()
            .find(|(id, _)| *id == book_id)
            .map(|(id, book)| BookDocument::new(*id, book.clone()))
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn update_book(
        &self,
        book_id: BookId,
        book: BookModel,
    ) -> Result<UpdateOutcome, BookRepositoryError> {
        let mut locked_books = self.books.write();
        match locked_books.iter_mut().find(|(id, _)| *id == book_id) {
            Some((_, stored)) if *stored == book => Ok(UpdateOutcome {
                matched: 1,
                modified: 0,
            }),
            Some((_, stored)) => {
                *stored = book;
                Ok(UpdateOutcome {
                    matched: 1,
                    modified: 1,
                })
            }
            None => Ok(UpdateOutcome::default()),
        }
    }
}
