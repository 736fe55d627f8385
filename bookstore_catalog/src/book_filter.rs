use std::str::FromStr;

use bson::Document;

use crate::api::{BookId, BookModel, BookQuery, InvalidBookId};

/// Validated form of [`BookQuery`]. Every present constraint has to hold for a book to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFilter {
    pub book_id: Option<BookId>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl BookFilter {
    /// Validates query parameters. Empty strings are treated like missing parameters.
    /// A price bound of zero is still a bound, so a lone `max_price=0` does not list every
    /// book the way a falsy check on the raw parameters would.
    pub fn from_query(query: BookQuery) -> Result<Self, InvalidBookId> {
        let book_id = non_empty(query.book_id)
            .map(|book_id| BookId::from_str(&book_id))
            .transpose()?;

        Ok(Self {
            book_id,
            author: non_empty(query.author),
            genre: non_empty(query.genre),
            min_price: query.min_price,
            max_price: query.max_price,
        })
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Builds mongodb filter document, price bounds end up in a single range on `price`
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(book_id) = &self.book_id {
            filter.insert("_id", book_id.as_object_id());
        }
        if let Some(author) = &self.author {
            filter.insert("author", author.as_str());
        }
        if let Some(genre) = &self.genre {
            filter.insert("genre", genre.as_str());
        }

        let mut price_range = Document::new();
        if let Some(min_price) = self.min_price {
            price_range.insert("$gte", min_price);
        }
        if let Some(max_price) = self.max_price {
            price_range.insert("$lte", max_price);
        }
        if !price_range.is_empty() {
            filter.insert("price", price_range);
        }
        filter
    }

    /// Evaluates the filter in process, with the same semantics as [`Self::to_document`]
    pub fn matches(&self, book_id: &BookId, book: &BookModel) -> bool {
        self.book_id.as_ref().map_or(true, |id| id == book_id)
            && self.author.as_ref().map_or(true, |author| author == &book.author)
            && self.genre.as_ref().map_or(true, |genre| genre == &book.genre)
            && self.min_price.map_or(true, |min| book.price >= min)
            && self.max_price.map_or(true, |max| book.price <= max)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
