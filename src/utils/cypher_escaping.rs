//! Identifier escaping for Cypher text.
//!
//! Every name that reaches the rendered query (labels, relationship types,
//! property keys, projection fields, output aliases) goes through this module.
//! Values never do: they are bound as parameters.
//!
//! ## Conventions
//! - Labels are always backtick-quoted: ``:`Person` ``
//! - Everything else is quoted only when it is not a plain identifier
//! - A backtick inside a quoted name is doubled
//!
//! # Examples
//! ```
//! use cypher_builder::utils::cypher_escaping::{escape_label, escape_name};
//!
//! assert_eq!(escape_label("Person"), "`Person`");
//! assert_eq!(escape_name("name"), "name");
//! assert_eq!(escape_name("first name"), "`first name`");
//! assert_eq!(escape_name("a`b"), "`a``b`");
//! ```

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// A name that can appear in Cypher without quoting.
    static ref PLAIN_IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Whether `name` can be rendered without backticks.
pub fn is_plain_identifier(name: &str) -> bool {
    PLAIN_IDENTIFIER.is_match(name)
}

/// Quote a node label. Labels are always quoted.
pub fn escape_label(label: &str) -> String {
    format!("`{}`", label.replace('`', "``"))
}

/// Quote a property key, relationship type, or alias when required.
pub fn escape_name(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// Render a label list as `:`A`:`B``. Empty input gives an empty string.
pub fn render_labels<S: AsRef<str>>(labels: &[S]) -> String {
    labels
        .iter()
        .map(|label| format!(":{}", escape_label(label.as_ref())))
        .collect()
}
