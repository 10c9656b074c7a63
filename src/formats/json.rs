//! JSON dump of the AST, built on the `Serialize` derives of the AST types.

use crate::ast::Template;

pub fn to_json(template: &Template) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(template)
}
