pub mod error;
pub mod models;
pub mod response;
pub mod serializer;
pub mod tpl;
pub mod value;

pub use error::TemplateError;
pub use models::templater_options::{Environment, TemplaterOptions};
pub use response::Response;
pub use tpl::engine::Templater;
pub use value::Value;
