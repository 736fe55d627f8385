//! End to end tests, they expect the catalog service to be running at `BOOKSTORE_CATALOG_URL`
//! (`http://127.0.0.1:8080` by default).



#[cfg(test)]
pub(crate) fn catalog_url() -> String {
    std::env::var("BOOKSTORE_CATALOG_URL").unwrap_or("http://127.0.0.1:8080".to_string())
}
