use anyhow::Context;
use bson::doc;
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

use crate::api::{BookId, BookModel};
use crate::book_document::BookDocument;
use crate::book_filter::BookFilter;
use crate::books_repository::{BookRepository, BookRepositoryError, UpdateOutcome};

pub struct MongoBooksRepository {
    books: Collection<BookDocument>,
}

pub struct MongoBooksRepositoryConfig {
    pub connection_string: String,
    pub database: String,
    pub collection: String,
}

impl MongoBooksRepository {
    /// Connects to the database and checks that it responds.
    /// The collection is not created here, mongodb creates it on first insert.
    pub async fn init(config: MongoBooksRepositoryConfig) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(&config.connection_string)
            .await
            .context("Failed to parse mongodb connection string")?;
        tracing::info!(
            "Mongodb hosts: {:?}, database: {}, collection: {}",
            options.hosts,
            config.database,
            config.collection
        );
        let client = Client::with_options(options).context("Failed to create mongodb client")?;

        let database = client.database(&config.database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to reach mongodb")?;

        Ok(Self {
            books: database.collection(&config.collection),
        })
    }
}

#[async_trait::async_trait]
impl BookRepository for MongoBooksRepository {
    async fn add_book(&self, book: BookModel) -> Result<BookId, BookRepositoryError> {
        let result = self
            .books
            .clone_with_type::<BookModel>()
            .insert_one(&book)
            .await?;

        let object_id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| BookRepositoryError::Other("Id not returned".to_string()))?;

        Ok(BookId::from(object_id))
    }

    async fn find_books(&self, filter: &BookFilter) -> Result<Vec<BookModel>, BookRepositoryError> {
        let books = self
            .books
            .clone_with_type::<BookModel>()
            .find(filter.to_document())
            .projection(doc! { "_id": 0 })
            .await?
            .try_collect()
            .await?;
        Ok(books)
    }

    async fn get_book(&self, book_id: BookId) -> Result<BookDocument, BookRepositoryError> {
        self.books
            .find_one(doc! { "_id": book_id.as_object_id() })
            .await?
            .ok_or(BookRepositoryError::NotFound(book_id))
    }

    async fn update_book(
        &self,
        book_id: BookId,
        book: BookModel,
    ) -> Result<UpdateOutcome, BookRepositoryError> {
        let result = self
            .books
            .update_one(
                doc! { "_id": book_id.as_object_id() },
                doc! {
                    "$set": {
                        "title": book.title,
                        "author": book.author,
                        "genre": book.genre,
                        "price": book.price,
                    }
                },
            )
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }
}
