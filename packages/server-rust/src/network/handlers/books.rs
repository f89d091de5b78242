//! `/books` resource handlers.
//!
//! Each handler performs exactly one store call. Store errors become
//! responses through [`ApiError`].

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use bookshelf_core::{parse_id, Book, BookId, BookPayload, StoreError};
use bytes::Bytes;
use serde_json::Value;
use tracing::debug;

use super::AppState;
use crate::error::{ApiError, MessageBody};

/// True for `application/json` and `application/*+json`, parameters ignored.
fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Decodes a write body into a payload.
///
/// Bodies not declared as JSON are not parsed at all. Anything that is not a
/// JSON object with correctly typed fields decodes to an empty payload, which
/// validation then rejects with 400.
fn decode_payload(headers: &HeaderMap, body: &[u8]) -> BookPayload {
    if !is_json_content_type(headers) {
        debug!(bytes = body.len(), "book body not declared as JSON, ignoring it");
        return BookPayload::default();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|err| {
            debug!(%err, "book body has mistyped fields");
            BookPayload::default()
        }),
        Ok(_) => {
            debug!("book body is not a JSON object");
            BookPayload::default()
        }
        Err(err) => {
            debug!(%err, "book body is not valid JSON");
            BookPayload::default()
        }
    }
}

/// Textual path ids that are not positive integers match no record.
fn path_id(raw: &str) -> Result<BookId, StoreError> {
    parse_id(raw).ok_or(StoreError::NotFound)
}

/// `GET /books`
pub async fn list_books(State(state): State<AppState>) -> Json<Vec<Book>> {
    Json(state.store.list())
}

/// `GET /books/{id}`
pub async fn get_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Book>, ApiError> {
    let id = path_id(&raw_id)?;
    Ok(Json(state.store.get(id)?))
}

/// `POST /books`
pub async fn create_book(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Book>), ApiError> {
    let book = state.store.create(decode_payload(&headers, &body))?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// `PUT /books/{id}`
///
/// An unknown id wins over a bad body: 404 is reported before 400.
pub async fn update_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Book>, ApiError> {
    let id = path_id(&raw_id)?;
    Ok(Json(state.store.update(id, decode_payload(&headers, &body))?))
}

/// `DELETE /books/{id}`
pub async fn delete_book(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = path_id(&raw_id)?;
    state.store.delete(id)?;
    Ok(Json(MessageBody::new("Book deleted successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::handlers::test_support::seeded_state;

    const DUNE: &str = r#"{"title":"Dune","author":"Frank Herbert","publishedYear":1965}"#;

    fn body(json: &str) -> Bytes {
        Bytes::from(json.to_string())
    }

    fn typed(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type.parse().unwrap());
        headers
    }

    fn json_headers() -> HeaderMap {
        typed("application/json")
    }

    #[test]
    fn decode_payload_reads_object() {
        let payload = decode_payload(&json_headers(), DUNE.as_bytes());
        assert_eq!(payload, BookPayload::new("Dune", "Frank Herbert", 1965));
    }

    #[test]
    fn decode_payload_degrades_to_empty() {
        let json = json_headers();
        assert_eq!(decode_payload(&json, b""), BookPayload::default());
        assert_eq!(decode_payload(&json, b"not json"), BookPayload::default());
        assert_eq!(
            decode_payload(&json, b"[\"Dune\",\"Frank Herbert\",1965]"),
            BookPayload::default()
        );
        assert_eq!(decode_payload(&json, b"null"), BookPayload::default());
        assert_eq!(
            decode_payload(
                &json,
                br#"{"title":"Dune","author":"Frank Herbert","publishedYear":"1965"}"#
            ),
            BookPayload::default()
        );
    }

    #[test]
    fn json_content_type_variants_are_parsed() {
        for content_type in [
            "application/json",
            "application/json; charset=utf-8",
            "Application/JSON",
            "application/merge-patch+json",
        ] {
            assert_eq!(
                decode_payload(&typed(content_type), DUNE.as_bytes()),
                BookPayload::new("Dune", "Frank Herbert", 1965),
                "{content_type}"
            );
        }
    }

    #[test]
    fn body_without_json_content_type_is_ignored() {
        let form = typed("application/x-www-form-urlencoded");
        for headers in [HeaderMap::new(), typed("text/plain"), form] {
            assert_eq!(decode_payload(&headers, DUNE.as_bytes()), BookPayload::default());
        }
    }

    #[tokio::test]
    async fn list_returns_seed_records() {
        let Json(books) = list_books(State(seeded_state())).await;
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].title, "1984");
        assert_eq!(books[1].title, "To Kill a Mockingbird");
    }

    #[tokio::test]
    async fn get_existing_book() {
        let Json(book) = get_book(State(seeded_state()), Path("1".to_string()))
            .await
            .unwrap();
        assert_eq!(book.id, 1);
        assert_eq!(book.author, "George Orwell");
    }

    #[tokio::test]
    async fn get_unknown_or_non_numeric_id_is_not_found() {
        let state = seeded_state();
        for raw in ["99", "abc", "-1", ""] {
            let err = get_book(State(state.clone()), Path(raw.to_string()))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), StatusCode::NOT_FOUND, "id {raw:?}");
        }
    }

    #[tokio::test]
    async fn create_returns_201_with_assigned_id() {
        let state = seeded_state();
        let (status, Json(book)) = create_book(
            State(state.clone()),
            json_headers(),
            body(DUNE),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(book.id, 3);
        assert_eq!(state.store.len(), 3);
    }

    #[tokio::test]
    async fn create_with_missing_fields_is_400() {
        let state = seeded_state();
        let err = create_book(State(state.clone()), json_headers(), body(r#"{"title":"X"}"#))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.len(), 2);
    }

    #[tokio::test]
    async fn create_with_plain_text_body_is_400() {
        let state = seeded_state();
        let err = create_book(State(state.clone()), typed("text/plain"), body(DUNE))
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(state.store.len(), 2);
    }

    #[tokio::test]
    async fn update_prefers_404_over_400() {
        let err = update_book(
            State(seeded_state()),
            Path("99".to_string()),
            json_headers(),
            body("garbage"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_existing_with_bad_body_is_400() {
        let err = update_book(
            State(seeded_state()),
            Path("1".to_string()),
            json_headers(),
            body("{}"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_overwrites_fields() {
        let Json(book) = update_book(
            State(seeded_state()),
            Path("1".to_string()),
            json_headers(),
            body(r#"{"title":"Animal Farm","author":"George Orwell","publishedYear":1945}"#),
        )
        .await
        .unwrap();

        assert_eq!(book.id, 1);
        assert_eq!(book.title, "Animal Farm");
        assert_eq!(book.published_year, 1945);
    }

    #[tokio::test]
    async fn delete_acknowledges_then_404s() {
        let state = seeded_state();
        let Json(ack) = delete_book(State(state.clone()), Path("2".to_string()))
            .await
            .unwrap();
        assert_eq!(ack.message, "Book deleted successfully");

        let err = delete_book(State(state), Path("2".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }
}
