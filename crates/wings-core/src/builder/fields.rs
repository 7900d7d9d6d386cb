//! Field, placeholder and assignment list builders.

use std::collections::BTreeMap;

use crate::error::BuildError;
use crate::value::SqlValue;

/// Field name to value map for INSERT and UPDATE.
///
/// Keys are unique and iterate in lexicographic order, which makes every list
/// built from a `Data` independent of the order the caller inserted fields.
pub type Data = BTreeMap<String, SqlValue>;

/// The two matching lists of an INSERT statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertLists {
    /// Quoted, comma-joined field names.
    pub fields: String,
    /// `:name` placeholders in the same order as `fields`.
    pub placeholders: String,
}

/// Wraps an identifier in `quote`, doubling any embedded quote character.
#[must_use]
pub fn quote_identifier(name: &str, quote: char) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push(quote);
    for c in name.chars() {
        if c == quote {
            quoted.push(quote);
        }
        quoted.push(c);
    }
    quoted.push(quote);
    quoted
}

/// Returns the `:name` placeholder for a field.
pub(crate) fn placeholder(field: &str) -> Result<String, BuildError> {
    let mut chars = field.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(format!(":{field}"))
    } else {
        Err(BuildError::invalid_input(format!(
            "field '{field}' cannot be used as a parameter name"
        )))
    }
}

/// Builds the field and placeholder lists of an INSERT.
///
/// # Errors
///
/// Returns [`BuildError::InvalidInput`] for an empty map or a field name that
/// is not a plain identifier.
pub fn insert_lists(data: &Data, quote: char) -> Result<InsertLists, BuildError> {
    if data.is_empty() {
        return Err(BuildError::invalid_input("INSERT requires at least one field"));
    }

    let mut fields = Vec::with_capacity(data.len());
    let mut placeholders = Vec::with_capacity(data.len());
    for field in data.keys() {
        placeholders.push(placeholder(field)?);
        fields.push(quote_identifier(field, quote));
    }

    Ok(InsertLists {
        fields: fields.join(", "),
        placeholders: placeholders.join(", "),
    })
}

/// Builds the `field = :field` assignment list of an UPDATE.
///
/// # Errors
///
/// Returns [`BuildError::InvalidInput`] for an empty map or a field name that
/// is not a plain identifier.
pub fn update_assignments(data: &Data, quote: char) -> Result<String, BuildError> {
    if data.is_empty() {
        return Err(BuildError::invalid_input("UPDATE requires at least one field"));
    }

    let mut assignments = Vec::with_capacity(data.len());
    for field in data.keys() {
        let ph = placeholder(field)?;
        assignments.push(format!("{} = {ph}", quote_identifier(field, quote)));
    }

    Ok(assignments.join(", "))
}

/// Builds the projection of a SELECT.
///
/// An empty field set selects `*`. Otherwise the caller's order is kept.
#[must_use]
pub fn select_field_list<S: AsRef<str>>(fields: &[S], quote: char) -> String {
    if fields.is_empty() {
        return String::from("*");
    }

    fields
        .iter()
        .map(|field| quote_identifier(field.as_ref(), quote))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strips backslash escape artifacts and surrounding whitespace.
///
/// `\x` becomes `x` and `\\` becomes `\`; a dangling trailing backslash is
/// dropped. Nothing else about the fragment is inspected.
#[must_use]
pub fn sanitize(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    let mut chars = fragment.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    String::from(out.trim())
}
