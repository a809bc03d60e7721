//! ARM resource identifier grammar
//!
//! Identifiers are slash-delimited sequences of alternating key/value
//! segments, optionally ending in an unpaired action segment. Outside a
//! `providers/<namespace>` chain, keys are scope keys and the resource
//! type is attributed to the `Microsoft.Resources` namespace.

/// Resource type of the tenant root (`/`).
pub const TYPE_TENANT: &str = "Microsoft.Resources/tenants";
/// Resource type of a subscription id.
pub const TYPE_SUBSCRIPTION: &str = "Microsoft.Resources/subscriptions";
/// Resource type of a resource group id.
pub const TYPE_RESOURCE_GROUP: &str = "Microsoft.Resources/resourceGroups";

/// Split an identifier into segments. Returns `None` for strings that are
/// not even identifier-shaped (no leading slash, empty segments, trailing
/// slash). A bare `/` yields an empty segment list.
fn segments(id: &str) -> Option<Vec<&str>> {
    if !id.starts_with('/') {
        return None;
    }
    if id == "/" {
        return Some(Vec::new());
    }
    let body = &id[1..];
    if body.ends_with('/') {
        return None;
    }
    let segs: Vec<&str> = body.split('/').collect();
    if segs.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(segs)
}

/// Keys (scope keys, type segments, action names) must look like ARM
/// identifiers. Values are opaque and may contain anything but `/`.
fn key_ok(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-')
}

/// Walk an even-length segment list against the ARM grammar: an optional
/// `subscriptions/{id}` prefix with further scope pairs, then zero or more
/// `providers/{namespace}` chains each followed by type/name pairs.
fn grammar_ok(segs: &[&str]) -> bool {
    if segs.is_empty() {
        return true; // tenant root
    }
    let mut i = 0;
    match segs[0] {
        "subscriptions" => {
            i = 2;
            while i < segs.len() && segs[i] != "providers" {
                if !key_ok(segs[i]) {
                    return false;
                }
                i += 2;
            }
        }
        "providers" => {}
        _ => return false,
    }
    while i < segs.len() {
        if segs[i] != "providers" || !key_ok(segs[i + 1]) {
            return false;
        }
        i += 2;
        while i < segs.len() && segs[i] != "providers" {
            if !key_ok(segs[i]) {
                return false;
            }
            i += 2;
        }
    }
    true
}

/// Whether `id` is a well-formed resource identifier (even segment count,
/// valid against the ARM grammar). A bare `/` is the tenant root and valid.
pub fn is_resource_id(id: &str) -> bool {
    match segments(id) {
        Some(segs) => segs.len() % 2 == 0 && grammar_ok(&segs),
        None => false,
    }
}

/// Whether `id` is an action identifier: an odd segment count whose
/// even-length prefix is a valid resource identifier. Actions denote
/// operations, not resources.
pub fn is_action_id(id: &str) -> bool {
    match segments(id) {
        Some(segs) if segs.len() % 2 == 1 => {
            key_ok(segs[segs.len() - 1]) && grammar_ok(&segs[..segs.len() - 1])
        }
        _ => false,
    }
}

/// The parent identifier: the id with its last key/value pair removed, or
/// the last segment alone for action ids. The tenant root has no parent.
pub fn parent_id(id: &str) -> Option<String> {
    let segs = segments(id)?;
    if segs.is_empty() {
        return None;
    }
    let cut = if segs.len() % 2 == 1 {
        segs.len() - 1
    } else {
        segs.len() - 2
    };
    if cut == 0 {
        return Some("/".to_string());
    }
    Some(format!("/{}", segs[..cut].join("/")))
}

/// The resource type of a valid resource identifier. Within a provider
/// chain the type is `namespace/typeSegments...`, keyed off the most
/// recent `providers` anchor; outside any chain the type is attributed to
/// `Microsoft.Resources` by the last scope key.
pub fn resource_type_of(id: &str) -> String {
    let Some(segs) = segments(id) else {
        return String::new();
    };
    if segs.is_empty() {
        return TYPE_TENANT.to_string();
    }
    let mut anchor = None;
    let mut i = 0;
    while i < segs.len() {
        if segs[i] == "providers" {
            anchor = Some(i);
        }
        i += 2;
    }
    match anchor {
        Some(a) => {
            let mut parts = vec![segs[a + 1].to_string()];
            let mut j = a + 2;
            while j + 1 < segs.len() {
                parts.push(segs[j].to_string());
                j += 2;
            }
            parts.join("/")
        }
        None => format!("Microsoft.Resources/{}", segs[segs.len() - 2]),
    }
}

/// The last value segment of an identifier (the resource's own name).
pub fn name_of(id: &str) -> Option<String> {
    let segs = segments(id)?;
    if segs.is_empty() || segs.len() % 2 == 1 {
        return None;
    }
    Some(segs[segs.len() - 1].to_string())
}
