//! Accessor naming conventions
//!
//! `getName`/`isActive` read a property, `setName` writes it. The property
//! name is the method name without its prefix, with the first character
//! lower-cased unless the first two are both upper case (`getURL` -> `URL`).

/// Property name for an accessor method, or `None` if the name does not
/// follow the convention
pub fn method_to_property(method: &str) -> Option<String> {
    let stripped = if let Some(rest) = method.strip_prefix("is") {
        rest
    } else if let Some(rest) = method.strip_prefix("get") {
        rest
    } else if let Some(rest) = method.strip_prefix("set") {
        rest
    } else {
        return None;
    };
    if stripped.is_empty() {
        return None;
    }
    Some(decapitalize(stripped))
}

/// `getX` (length > 3) or `isX` (length > 2)
pub fn is_getter(method: &str) -> bool {
    (method.starts_with("get") && method.len() > 3) || (method.starts_with("is") && method.len() > 2)
}

/// `setX` (length > 3)
pub fn is_setter(method: &str) -> bool {
    method.starts_with("set") && method.len() > 3
}

/// Upper-case the first character
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    let first = chars.next();
    let second = chars.next();
    match (first, second) {
        (Some(a), Some(b)) if a.is_uppercase() && b.is_uppercase() => name.to_string(),
        (Some(a), _) => {
            let mut out: String = a.to_lowercase().collect();
            out.push_str(&name[a.len_utf8()..]);
            out
        }
        (None, _) => String::new(),
    }
}
