pub mod error;
pub mod json;
pub mod text;

pub use error::TtsSaveError;
pub use json::*;
pub use text::*;
