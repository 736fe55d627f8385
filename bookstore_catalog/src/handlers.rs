use std::str::FromStr;
use std::sync::Arc;

use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{
    BookId, BookModel, BookQuery, BookResponse, CreateBookResponse, ErrorResponse,
    MessageResponse,
};
use crate::book_filter::BookFilter;
use crate::books_repository::{BookRepository, BookRepositoryError};

const INVALID_BOOK_ID: &str = "Invalid book_id format";
const BOOK_NOT_FOUND: &str = "Book not found";

fn invalid_book_id() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse::new(INVALID_BOOK_ID))
}

fn book_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(BOOK_NOT_FOUND))
}

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
pub async fn add_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book: web::Json<BookModel>,
) -> Result<HttpResponse, Error> {
    Ok(match books_repository.add_book(book.into_inner()).await {
        Ok(book_id) => HttpResponse::Ok().json(CreateBookResponse {
            message: "Book created successfully".to_string(),
            book_id: book_id.to_string(),
        }),
        Err(err) => {
            tracing::error!("Add book failed {}", err);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to create book"))
        }
    })
}

#[api_v2_operation]
pub async fn get_books(
    books_repository: Data<Arc<dyn BookRepository>>,
    query: web::Query<BookQuery>,
) -> Result<HttpResponse, Error> {
    let filter = match BookFilter::from_query(query.into_inner()) {
        Ok(filter) => filter,
        Err(err) => {
            tracing::debug!("{}", err);
            return Ok(invalid_book_id());
        }
    };
    if filter.is_empty() {
        tracing::debug!("No filters given, listing all books");
    }

    Ok(match books_repository.find_books(&filter).await {
        Ok(books) => HttpResponse::Ok().json(books),
        Err(err) => {
            tracing::error!("Get books failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn get_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let Ok(book_id) = BookId::from_str(book_id.as_str()) else {
        return Ok(invalid_book_id());
    };

    Ok(match books_repository.get_book(book_id).await {
        Ok(document) => HttpResponse::Ok().json(BookResponse::from(document)),
        Err(BookRepositoryError::NotFound(_)) => book_not_found(),
        Err(err) => {
            tracing::error!("Get book failed {}", err);
            HttpResponse::InternalServerError().finish()
        }
    })
}

#[api_v2_operation]
pub async fn update_book(
    books_repository: Data<Arc<dyn BookRepository>>,
    book_id: web::Path<String>,
    book: web::Json<BookModel>,
) -> Result<HttpResponse, Error> {
    let Ok(book_id) = BookId::from_str(book_id.as_str()) else {
        return Ok(invalid_book_id());
    };

    Ok(
        match books_repository
            .update_book(book_id, book.into_inner())
            .await
        {
            Ok(outcome) if outcome.modified == 1 => HttpResponse::Ok().json(MessageResponse {
                message: "Book updated successfully".to_string(),
            }),
            // A book whose values did not change is reported the same way as a missing one
            Ok(outcome) => {
                if outcome.matched > 0 {
                    tracing::debug!("Update of book {} changed nothing", book_id);
                }
                book_not_found()
            }
            Err(err) => {
                tracing::error!("Update book failed {}", err);
                HttpResponse::InternalServerError().finish()
            }
        },
    )
}

#[cfg(test)]
mod handler_tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{test, web, App};
    use paperclip::actix::OpenApiExt;
    use serde_json::{json, Value};

    use crate::api::{BookId, BookModel, BookResponse, CreateBookResponse};
    use crate::app_config::{config_app, json_config, query_config};
    use crate::book_document::BookDocument;
    use crate::book_filter::BookFilter;
    use crate::books_repository::{
        BookRepository, BookRepositoryError, InMemoryBookRepository, UpdateOutcome,
    };

    /// Repository whose every operation fails, as if the database went away
    struct UnavailableBookRepository;

    #[async_trait::async_trait]
    impl BookRepository for UnavailableBookRepository {
        async fn add_book(&self, _book: BookModel) -> Result<BookId, BookRepositoryError> {
            Err(BookRepositoryError::Other("Id not returned".to_string()))
        }

        async fn find_books(
            &self,
            _filter: &BookFilter,
        ) -> Result<Vec<BookModel>, BookRepositoryError> {
            Err(BookRepositoryError::Other("connection lost".to_string()))
        }

        async fn get_book(&self, _book_id: BookId) -> Result<BookDocument, BookRepositoryError> {
            Err(BookRepositoryError::Other("connection lost".to_string()))
        }

        async fn update_book(
            &self,
            _book_id: BookId,
            _book: BookModel,
        ) -> Result<UpdateOutcome, BookRepositoryError> {
            Err(BookRepositoryError::Other("connection lost".to_string()))
        }
    }

    macro_rules! init_app {
        () => {
            init_app!(InMemoryBookRepository::default())
        };
        ($repository:expr) => {{
            let books_repository: Arc<dyn BookRepository> = Arc::new($repository);
            test::init_service(
                App::new()
                    .wrap_api()
                    .app_data(web::Data::new(books_repository))
                    .app_data(json_config())
                    .app_data(query_config())
                    .configure(config_app)
                    .build(),
            )
            .await
        }};
    }

    macro_rules! create_book {
        ($app:expr, $book:expr) => {{
            let request = test::TestRequest::post()
                .uri("/api/books")
                .set_json($book)
                .to_request();
            let response: CreateBookResponse = test::call_and_read_body_json(&$app, request).await;
            assert_eq!(response.message, "Book created successfully");
            response.book_id
        }};
    }

    #[actix_web::test]
    async fn test_create_get_update_scenario() {
        let app = init_app!();

        let book_id = create_book!(
            app,
            json!({"title": "A", "author": "B", "genre": "C", "price": 9.99})
        );
        assert!(BookId::from_str(&book_id).is_ok());

        let request = test::TestRequest::get()
            .uri(&format!("/api/books/{}", book_id))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            json!({"id": book_id, "title": "A", "author": "B", "genre": "C", "price": 9.99})
        );

        let request = test::TestRequest::put()
            .uri(&format!("/api/books/{}", book_id))
            .set_json(json!({"title": "A2", "author": "B2", "genre": "C2", "price": 1.5}))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"message": "Book updated successfully"}));

        let request = test::TestRequest::get()
            .uri(&format!("/api/books/{}", book_id))
            .to_request();
        let body: BookResponse = test::call_and_read_body_json(&app, request).await;
        assert_eq!(
            body,
            BookResponse {
                id: book_id,
                title: "A2".to_string(),
                author: "B2".to_string(),
                genre: "C2".to_string(),
                price: 1.5,
            }
        );
    }

    #[actix_web::test]
    async fn test_invalid_and_missing_ids() {
        let app = init_app!();

        let request = test::TestRequest::get()
            .uri("/api/books/not-an-id")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"detail": "Invalid book_id format"}));

        let request = test::TestRequest::get()
            .uri(&format!("/api/books/{}", BookId::generate()))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"detail": "Book not found"}));

        let book = json!({"title": "A", "author": "B", "genre": "C", "price": 9.99});
        let request = test::TestRequest::put()
            .uri("/api/books/not-an-id")
            .set_json(book.clone())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let request = test::TestRequest::put()
            .uri(&format!("/api/books/{}", BookId::generate()))
            .set_json(book)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let request = test::TestRequest::get()
            .uri("/api/books?book_id=not-an-id")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_update_with_same_values_is_not_found() {
        let app = init_app!();
        let book = json!({"title": "A", "author": "B", "genre": "C", "price": 9.99});
        let book_id = create_book!(app, book.clone());

        let request = test::TestRequest::put()
            .uri(&format!("/api/books/{}", book_id))
            .set_json(book)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_malformed_bodies_are_unprocessable() {
        let app = init_app!();

        for body in [
            json!({"title": "A", "author": "B", "genre": "C"}),
            json!({"title": "A", "author": "B", "genre": "C", "price": "cheap"}),
            json!({"title": 1, "author": "B", "genre": "C", "price": 1.0}),
        ] {
            let request = test::TestRequest::post()
                .uri("/api/books")
                .set_json(body.clone())
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

            let request = test::TestRequest::put()
                .uri(&format!("/api/books/{}", BookId::generate()))
                .set_json(body)
                .to_request();
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        }

        let request = test::TestRequest::get()
            .uri("/api/books?min_price=cheap")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_list_and_filter_books() {
        let app = init_app!();

        let request = test::TestRequest::get().uri("/api/books").to_request();
        let body: Vec<BookModel> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(body, vec![]);

        let mut ids = vec![];
        for (title, author, price) in [
            ("one", "X", 5.0),
            ("two", "Y", 10.0),
            ("three", "X", 20.0),
            ("four", "X", 25.0),
        ] {
            ids.push(create_book!(
                app,
                json!({"title": title, "author": author, "genre": "novel", "price": price})
            ));
        }

        let titles = |books: Vec<Value>| -> Vec<String> {
            books
                .into_iter()
                .map(|book| {
                    assert!(book.get("id").is_none());
                    assert!(book.get("_id").is_none());
                    book["title"].as_str().unwrap().to_string()
                })
                .collect()
        };

        let request = test::TestRequest::get().uri("/api/books").to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(titles(body), vec!["one", "two", "three", "four"]);

        let request = test::TestRequest::get()
            .uri("/api/books?min_price=10&max_price=20")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(titles(body), vec!["two", "three"]);

        let request = test::TestRequest::get()
            .uri("/api/books?author=X&min_price=10")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(titles(body), vec!["three", "four"]);

        let request = test::TestRequest::get()
            .uri(&format!("/api/books?book_id={}", ids[1]))
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, request).await;
        assert_eq!(titles(body), vec!["two"]);

        let request = test::TestRequest::get()
            .uri("/api/books?genre=poetry")
            .to_request();
        let body: Vec<Value> = test::call_and_read_body_json(&app, request).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_store_failures_are_internal_errors() {
        let app = init_app!(UnavailableBookRepository);
        let book = json!({"title": "A", "author": "B", "genre": "C", "price": 9.99});

        let request = test::TestRequest::post()
            .uri("/api/books")
            .set_json(book.clone())
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(response).await;
        assert_eq!(body, json!({"detail": "Failed to create book"}));

        for request in [
            test::TestRequest::get().uri("/api/books").to_request(),
            test::TestRequest::get()
                .uri("/api/books?author=B")
                .to_request(),
            test::TestRequest::get()
                .uri(&format!("/api/books/{}", BookId::generate()))
                .to_request(),
            test::TestRequest::put()
                .uri(&format!("/api/books/{}", BookId::generate()))
                .set_json(book.clone())
                .to_request(),
        ] {
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }

        // malformed ids are rejected before the repository is asked
        for request in [
            test::TestRequest::get()
                .uri("/api/books/not-an-id")
                .to_request(),
            test::TestRequest::get()
                .uri("/api/books?book_id=not-an-id")
                .to_request(),
            test::TestRequest::put()
                .uri("/api/books/not-an-id")
                .set_json(book.clone())
                .to_request(),
        ] {
            let response = test::call_service(&app, request).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn test_zero_price_bound_filters() {
        let app = init_app!();
        for (title, price) in [("negative", -5.0), ("free", 0.0), ("paid", 3.0)] {
            create_book!(
                app,
                json!({"title": title, "author": "A", "genre": "G", "price": price})
            );
        }

        let request = test::TestRequest::get()
            .uri("/api/books?max_price=0")
            .to_request();
        let body: Vec<BookModel> = test::call_and_read_body_json(&app, request).await;
        let titles: Vec<&str> = body.iter().map(|book| book.title.as_str()).collect();
        assert_eq!(titles, vec!["negative", "free"]);

        let request = test::TestRequest::get()
            .uri("/api/books?min_price=0")
            .to_request();
        let body: Vec<BookModel> = test::call_and_read_body_json(&app, request).await;
        let titles: Vec<&str> = body.iter().map(|book| book.title.as_str()).collect();
        assert_eq!(titles, vec!["free", "paid"]);
    }

    #[actix_web::test]
    async fn test_repeated_query_parameter_is_unprocessable() {
        let app = init_app!();
        let request = test::TestRequest::get()
            .uri("/api/books?author=B&author=C")
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("author"));
    }

    #[actix_web::test]
    async fn test_health() {
        let app = init_app!();
        let request = test::TestRequest::get().uri("/health").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
