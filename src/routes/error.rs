use askama::Template;

/// Generic error page shown when a request can't be completed.
#[derive(Template)]
#[template(path = "error.html")]
pub(crate) struct ErrorTemplate {}
