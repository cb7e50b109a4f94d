use std::fmt::Write;

use serde_json as json;

// Renders a JSON value into a string that is identical for any two values that are equal,
// regardless of how the underlying maps order their keys.  Used as the sort key when we need to
// compare lists without caring about element order.
struct CanonicalJsonValue<'a>(&'a json::Value);

impl<'a> CanonicalJsonValue<'a> {
    fn write_to(&self, out: &mut String) {
        match self.0 {
            json::Value::Null => out.push_str("null"),
            json::Value::Bool(b) => {
                let _ = write!(out, "{b}");
            },
            json::Value::Number(n) => {
                let _ = write!(out, "{n}");
            },
            json::Value::String(s) => {
                // serde_json's Display handles all the escaping for us
                let _ = write!(out, "{}", json::Value::String(s.clone()));
            },
            json::Value::Array(a) => {
                out.push('[');
                for (i, v) in a.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    CanonicalJsonValue(v).write_to(out);
                }
                out.push(']');
            },
            json::Value::Object(o) => {
                let mut keys: Vec<_> = o.keys().collect();
                keys.sort();

                out.push('{');
                for (i, k) in keys.into_iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    let _ = write!(out, "{}:", json::Value::String(k.clone()));
                    CanonicalJsonValue(&o[k]).write_to(out);
                }
                out.push('}');
            },
        }
    }
}

pub fn canonical_string(v: &json::Value) -> String {
    let mut out = String::new();
    CanonicalJsonValue(v).write_to(&mut out);
    out
}

// Sorts the items by their canonical rendering; the sort is stable so equal items keep their
// relative order
pub fn sort_canonical<T, F>(items: &mut [T], to_json: F)
where
    F: Fn(&T) -> json::Value,
{
    items.sort_by_cached_key(|item| canonical_string(&to_json(item)));
}
