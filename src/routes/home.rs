use axum::response::Html;

pub async fn home() -> Html<&'static str> {
    Html(
        "<html><body>This is the placeholder homepage for the PR Linked Issues GitHub App.</body></html>",
    )
}

pub async fn healthz() -> &'static str {
    "ok"
}
