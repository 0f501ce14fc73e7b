//! Lookup, truthiness and stringification rules shared by the interpreter
//! and the context builders that feed it.

use std::borrow::Cow;

use serde_json::Value;

/// Resolve a dotted path against `scope`. A bare `this` names the scope
/// only when it is a scalar (the current item of a loop over scalars), never
/// a mapping or sequence. Sequence items can be addressed by index
/// (`items.0.name`).
pub fn lookup<'v>(scope: &'v Value, path: &str) -> Option<&'v Value> {
    let path = path.trim();
    let path = match path.strip_prefix("this") {
        Some("") => return (!scope.is_object() && !scope.is_array()).then_some(scope),
        Some(rest) if rest.starts_with('.') => &rest[1..],
        _ => path,
    };

    path.split('.').try_fold(scope, |value, key| {
        let key = key.trim();
        match value {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    })
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text substituted for a value. Strings are emitted verbatim, without
/// escaping; `null` is empty; containers render as compact JSON.
pub fn to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}
