//! Output formats for parsed templates
//!
//! Both formats are diagnostic dumps of the AST, meant for tests and
//! debugging rather than for rendering templates.

pub mod json;
pub mod treeviz;

pub use json::to_json;
pub use treeviz::to_treeviz_str;
