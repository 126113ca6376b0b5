use anyhow::{Context as _, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tera::{Context, Tera};

use crate::{environment::Environment, functions};

/// Recursively rewrites every string leaf inside `template` by evaluating it
/// as a text template against `env` (`spec.md` §4.B). The traversal goes
/// through a JSON intermediate representation: `template` is serialised,
/// walked, and deserialised back into `T`, which keeps the walker agnostic
/// of the concrete Job shape while preserving non-string fields bit for bit.
pub fn expand<T>(template: &T, env: &Environment) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut tera = Tera::default();
    functions::register(&mut tera);
    let context = Context::from_serialize(env).context("failed to build template context")?;

    let value = serde_json::to_value(template).context("failed to serialise template")?;
    let value = walk(value, &mut tera, &context)?;
    serde_json::from_value(value).context("failed to deserialise expanded template")
}

/// String leaves are rendered in place; records (objects) and lists recurse
/// into every field/element; anything else (numbers, booleans, null) is
/// left untouched.
fn walk(value: Value, tera: &mut Tera, context: &Context) -> Result<Value> {
    match value {
        Value::String(text) => tera
            .render_str(&text, context)
            .map(Value::String)
            .with_context(|| format!("failed to expand template leaf {text:?}")),
        Value::Array(items) => items
            .into_iter()
            .map(|item| walk(item, tera, context))
            .collect::<Result<_>>()
            .map(Value::Array),
        Value::Object(fields) => fields
            .into_iter()
            .map(|(key, field)| walk(field, tera, context).map(|field| (key, field)))
            .collect::<Result<_>>()
            .map(Value::Object),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Nested {
        name: String,
        replicas: i32,
        enabled: bool,
        tags: Vec<String>,
        child: Option<Box<Nested>>,
    }

    fn env() -> Environment {
        Environment {
            name: "exec-1".into(),
            payload: "world".into(),
            uuid: "abcd1234-0000".into(),
            short_uuid: "abcd1234".into(),
            date: "2026-07-31".into(),
        }
    }

    #[test]
    fn rewrites_string_leaves_and_recurses_into_lists_and_records() {
        let input = Nested {
            name: "hello-{{ payload }}".into(),
            replicas: 3,
            enabled: true,
            tags: vec!["{{ name }}".into(), "static".into()],
            child: Some(Box::new(Nested {
                name: "{{ short_uuid }}".into(),
                replicas: 1,
                enabled: false,
                tags: vec![],
                child: None,
            })),
        };

        let expanded = expand(&input, &env()).unwrap();
        assert_eq!(expanded.name, "hello-world");
        assert_eq!(expanded.tags, vec!["exec-1", "static"]);
        assert_eq!(expanded.child.unwrap().name, "abcd1234");
    }

    #[test]
    fn leaves_non_string_fields_bit_identical() {
        let input = Nested {
            name: "{{ name }}".into(),
            replicas: 42,
            enabled: true,
            tags: vec![],
            child: None,
        };
        let expanded = expand(&input, &env()).unwrap();
        assert_eq!(expanded.replicas, 42);
        assert!(expanded.enabled);
    }

    #[test]
    fn fail_function_aborts_expansion() {
        let input = Nested {
            name: r#"{{ fail(message="expected error") }}"#.into(),
            replicas: 0,
            enabled: false,
            tags: vec![],
            child: None,
        };
        assert!(expand(&input, &env()).is_err());
    }
}
