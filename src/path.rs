//! Data model path handling.
//!
//! Paths are slash-delimited (`/a/b/0/c`). For convenience the store also
//! accepts dot and bracket notation, so `book.0.title` and `book[0].title`
//! address the same location as `/book/0/title`.

/// Leading segment authors use to name "the current element" inside a template.
const ITEM_PREFIX: &str = "/item";

/// Prefix of an explicitly relative path.
const RELATIVE_PREFIX: &str = "./";

/// Path returned when a binding names the current element itself.
pub const CURRENT_ELEMENT: &str = ".";

/// Combine a binding path with a data context path.
///
/// An absolute `path` always overrides the context.
///
/// ```
/// use surface_model::resolve_path;
///
/// assert_eq!(resolve_path("/a/b", "/items/0"), "/a/b");
/// assert_eq!(resolve_path("name", "/items/0/"), "/items/0/name");
/// assert_eq!(resolve_path("name", ""), "/name");
/// ```
pub fn resolve_path(path: &str, base: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

/// Strip the authoring conventions used for bindings inside a template.
///
/// `/item/name` becomes `/name` and `./name` becomes `name`. A bare `/item`
/// names the current element and becomes `.`. Anything else is unchanged.
pub fn trim_in_data_context(path: &str) -> String {
    if let Some(rest) = path.strip_prefix(ITEM_PREFIX) {
        if rest.is_empty() {
            return CURRENT_ELEMENT.to_string();
        }
        if rest.starts_with('/') {
            return rest.to_string();
        }
    }
    if let Some(rest) = path.strip_prefix(RELATIVE_PREFIX) {
        return rest.to_string();
    }
    path.to_string()
}

/// Split a path into its non-empty segments.
///
/// `/`, `.`, `[` and `]` all act as separators, so the root is addressed by
/// `""`, `"/"` or `"."`.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split(['/', '.', '[', ']'])
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Canonical slash form of a path.
///
/// ```
/// use surface_model::path::normalize_path;
///
/// assert_eq!(normalize_path("bookRecommendations[0].title"), "/bookRecommendations/0/title");
/// assert_eq!(normalize_path("book.0.title"), "/book/0/title");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    format!("/{}", path_segments(path).join("/"))
}
