//! Attribute identifier sanitization.
//!
//! Native attribute names may contain any character. Stored identifiers
//! keep only `[A-Za-z0-9_]`, everything else becomes `_`, and the result is
//! suffixed with `_` until it collides with neither a [`TreeNode`] member
//! name nor a reserved word. Both lists are static data, so sanitization is
//! a pure function.
//!
//! [`TreeNode`]: crate::TreeNode

/// Public members of `TreeNode`. Keep in sync with its API.
pub const STRUCTURAL_MEMBERS: &[&str] = &[
    "add_attribute",
    "add_child",
    "attribute",
    "attributes",
    "attributes_state",
    "bound",
    "child",
    "child_names",
    "children",
    "children_mut",
    "children_state",
    "clone",
    "collapse_level",
    "detach",
    "find",
    "find_mut",
    "from_json",
    "has_attribute",
    "is_detached",
    "name",
    "new",
    "remove_attribute",
    "remove_child",
    "rename_child",
    "render",
    "resolve",
    "retain_children",
    "select",
    "to_json",
    "to_json_pretty",
    "to_string",
    "with_attribute",
    "with_child",
];

/// Reserved words shared with downstream consumers that expose attributes
/// as fields.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "exec", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "not", "or",
    "pass", "print", "raise", "return", "try", "while", "with", "yield",
];

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn is_reserved(id: &str) -> bool {
    STRUCTURAL_MEMBERS.contains(&id) || RESERVED_KEYWORDS.contains(&id)
}

fn translate(name: &str) -> String {
    name.chars()
        .map(|c| if is_identifier_char(c) { c } else { '_' })
        .collect()
}

/// Sanitizes `name` and suffixes `_` while the candidate is reserved or
/// `taken` reports it as already used.
pub fn sanitize_with(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let mut id = translate(name);
    while is_reserved(&id) || taken(&id) {
        id.push('_');
    }
    id
}

/// Sanitizes an identifier for insertion or lookup on an existing node.
pub fn sanitize_identifier(name: &str) -> String {
    sanitize_with(name, |_| false)
}

/// Sanitizes an identifier while importing, where a previously imported
/// attribute of the same node also counts as a collision.
pub(crate) fn import_identifier(name: &str, taken: impl Fn(&str) -> bool) -> String {
    sanitize_with(name, taken)
}
