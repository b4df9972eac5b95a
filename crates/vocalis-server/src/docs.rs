use axum::response::Html;

const INDEX: &str = include_str!("docs.html");

/// Static endpoint documentation
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX)
}
