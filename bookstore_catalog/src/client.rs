use anyhow::{bail, Context};
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    BookId, BookModel, BookQuery, BookResponse, CreateBookResponse, ErrorResponse,
};

pub struct BookstoreCatalogClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookstoreCatalogClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.to_string(),
            client,
        })
    }

    /// Calls POST /api/books endpoint
    /// Returns id assigned to the book
    pub async fn add_book(&self, book: BookModel) -> anyhow::Result<BookId> {
        let response = self
            .client
            .post(format!("{}/api/books", self.url))
            .json(&book)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Failed to add book {}", error_detail(response).await)
        }

        let created: CreateBookResponse = response.json().await?;
        created
            .book_id
            .parse()
            .context("Failed to parse book id")
    }

    /// Calls GET /api/books endpoint with the given filters
    pub async fn list_books(&self, query: &BookQuery) -> anyhow::Result<Vec<BookModel>> {
        let response = self
            .client
            .get(format!("{}/api/books", self.url))
            .query(query)
            .send()
            .await?;
        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!("Failed to list books {}", error_detail(response).await)
        }
    }

    /// Calls GET /api/books/{book_id} endpoint
    /// Returns None if book was not in the repository
    pub async fn get_book(&self, book_id: BookId) -> anyhow::Result<Option<BookResponse>> {
        let response = self
            .client
            .get(format!("{}/api/books/{}", self.url, book_id))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(None)
        } else if response.status().is_success() {
            Ok(Some(response.json().await?))
        } else {
            bail!("Failed to get book {}", error_detail(response).await)
        }
    }

    /// Calls PUT /api/books/{book_id} endpoint
    /// Returns false if the service answered with not found, which also happens when nothing changed
    pub async fn update_book(&self, book_id: BookId, book: BookModel) -> anyhow::Result<bool> {
        let response = self
            .client
            .put(format!("{}/api/books/{}", self.url, book_id))
            .json(&book)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else if response.status().is_success() {
            Ok(true)
        } else {
            bail!("Failed to update book {}", error_detail(response).await)
        }
    }
}

async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<ErrorResponse>()
        .await
        .map(|error| format!("{}: {}", status, error.detail))
        .unwrap_or_else(|_| status.to_string())
}
