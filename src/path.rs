use serde_json::Value;

/// Walks `record` along a dot-separated `path` such as `snippet.thumbnails.standard.url`.
///
/// Returns `None` when any segment is missing, when an intermediate value is
/// `null` or a primitive, or when the final value is `null`. Numeric segments
/// index into arrays.
pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(record, |current, key| match current {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|idx| items.get(idx)),
            _ => None,
        })
        .filter(|value| !value.is_null())
}

/// Like [`resolve`], but only yields string values.
pub fn resolve_str<'a>(record: &'a Value, path: &str) -> Option<&'a str> {
    resolve(record, path).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_value() {
        let record = json!({ "foo": { "bar": 10, "baz": { "qux": ["a", "b"] } } });

        assert_eq!(resolve(&record, "foo.bar"), Some(&json!(10)));
        assert_eq!(resolve(&record, "foo.baz.qux"), Some(&json!(["a", "b"])));
        assert_eq!(resolve(&record, "foo.baz.qux.1"), Some(&json!("b")));
        assert_eq!(resolve_str(&record, "foo.baz.qux.0"), Some("a"));
    }

    #[test]
    fn missing_segments() {
        let record = json!({ "snippet": { "title": "x", "thumbnails": null }, "count": 0 });

        assert!(resolve(&record, "status.privacyStatus").is_none());
        assert!(resolve(&record, "snippet.thumbnails.standard.url").is_none());
        assert!(resolve(&record, "snippet.title.length").is_none());
        assert!(resolve(&record, "count.value").is_none());
        assert!(resolve(&record, "snippet.thumbnails").is_none());
        assert!(resolve(&json!(null), "a").is_none());
    }

    #[test]
    fn falsy_leaves_are_kept() {
        let record = json!({ "a": { "zero": 0, "empty": "", "no": false } });

        assert_eq!(resolve(&record, "a.zero"), Some(&json!(0)));
        assert_eq!(resolve(&record, "a.empty"), Some(&json!("")));
        assert_eq!(resolve(&record, "a.no"), Some(&json!(false)));
    }
}
