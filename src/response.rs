use crate::tpl::engine::Templater;
use serde::Serialize;
use tracing::debug;

/// Rendered page as handed to the HTTP layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn ok(body: String) -> Self {
        Response { status: 200, body }
    }

    pub fn internal_error(body: String) -> Self {
        Response { status: 500, body }
    }
}

impl Templater {
    /// Renders `name` into a response. Failures become a 500; the error
    /// details are only shown outside production.
    pub fn respond<T: Serialize + ?Sized>(&self, name: &str, ctx: &T) -> Response {
        match self.render(name, ctx) {
            Ok(body) => Response::ok(body),
            Err(err) => {
                debug!("render failed: template={}, error={}", name, err);
                if self.options().environment.is_production() {
                    Response::internal_error("Internal Server Error".to_string())
                } else {
                    Response::internal_error(format!("{}\n{:#?}", err, err))
                }
            }
        }
    }
}
