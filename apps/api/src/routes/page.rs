use axum::response::Html;

/// GET /
/// The single-page search client.
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}
