use std::collections::HashMap;

use serde_json::Value;
use tera::{Error, Result, Tera};
use uuid::Uuid;

/// Registers the auxiliary function library required by `spec.md` §4.B: a
/// JSON round-trip (`from_json`/`to_json`), a UUID-v4 generator, and an
/// explicit-failure escape hatch. `upper`/`lower`/`replace` are Tera
/// built-ins and need no registration.
pub fn register(tera: &mut Tera) {
    tera.register_filter("from_json", from_json);
    tera.register_filter("to_json", to_json);
    tera.register_function("uuidv4", uuidv4);
    tera.register_function("fail", fail);
}

/// Parses `value` (expected to be a string) as JSON. Returns `Value::Null`
/// on a parse failure rather than aborting, so templates can branch on it
/// with `{% if value | from_json %}...{% else %}...{% endif %}`.
fn from_json(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    let text = match value.as_str() {
        Some(text) => text,
        None => return Ok(Value::Null),
    };
    Ok(serde_json::from_str(text).unwrap_or(Value::Null))
}

fn to_json(value: &Value, _args: &HashMap<String, Value>) -> Result<Value> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|error| Error::msg(format!("failed to serialise to JSON: {error}")))
}

fn uuidv4(_args: &HashMap<String, Value>) -> Result<Value> {
    Ok(Value::String(Uuid::new_v4().to_string()))
}

/// Aborts template evaluation with the given message (`spec.md` §4.B, §8
/// scenario (d)).
fn fail(args: &HashMap<String, Value>) -> Result<Value> {
    let message = args
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("template evaluation failed");
    Err(Error::msg(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tera::Context;

    fn tera_with_functions() -> Tera {
        let mut tera = Tera::default();
        register(&mut tera);
        tera
    }

    #[test]
    fn from_json_parses_valid_json() {
        let mut tera = tera_with_functions();
        let rendered = tera
            .render_str(
                r#"{{ payload | from_json | to_json }}"#,
                &{
                    let mut ctx = Context::new();
                    ctx.insert("payload", "{\"hello\":\"world\"}");
                    ctx
                },
            )
            .unwrap();
        assert_eq!(rendered, r#"{"hello":"world"}"#);
    }

    #[test]
    fn from_json_falls_back_on_parse_failure() {
        let mut tera = tera_with_functions();
        let rendered = tera
            .render_str(
                r#"{% if payload | from_json %}json{% else %}{{ payload }}{% endif %}"#,
                &{
                    let mut ctx = Context::new();
                    ctx.insert("payload", "\n\"hello\": \"world\"\n");
                    ctx
                },
            )
            .unwrap();
        assert_eq!(rendered, "\n\"hello\": \"world\"\n");
    }

    #[test]
    fn uuidv4_produces_36_characters() {
        let mut tera = tera_with_functions();
        let rendered = tera.render_str("{{ uuidv4() }}", &Context::new()).unwrap();
        assert_eq!(rendered.len(), 36);
    }

    #[test]
    fn fail_aborts_rendering() {
        use std::error::Error as _;

        let mut tera = tera_with_functions();
        let error = tera
            .render_str(r#"{{ fail(message="expected error") }}"#, &Context::new())
            .unwrap_err();
        let mut chain = error.to_string();
        let mut cause: Option<&dyn std::error::Error> = error.source();
        while let Some(error) = cause {
            chain.push_str(" | ");
            chain.push_str(&error.to_string());
            cause = error.source();
        }
        assert!(chain.contains("expected error"), "error chain was: {chain}");
    }
}
