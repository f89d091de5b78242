//! Human-readable usage page served at `/`.

use axum::response::Html;

const USAGE_PAGE: &str = r#"<h1>Welcome to the Book API</h1>
<p>This API manages a list of books. Available endpoints:</p>
<ul>
  <li><strong>GET /books</strong> - Retrieve all books</li>
  <li><strong>GET /books/:id</strong> - Retrieve a book by ID</li>
  <li><strong>POST /books</strong> - Add a new book</li>
  <li><strong>PUT /books/:id</strong> - Update a book</li>
  <li><strong>DELETE /books/:id</strong> - Delete a book</li>
</ul>
<p>Send JSON bodies of the form <code>{"title", "author", "publishedYear"}</code> with <strong>POST</strong> and <strong>PUT</strong> requests.</p>
"#;

/// `GET /`
pub async fn index_handler() -> Html<&'static str> {
    Html(USAGE_PAGE)
}
