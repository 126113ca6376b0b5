use dispatcher_api::ExecutionRequestCrd;
use kube::ResourceExt;
use serde::Serialize;

/// The per-execution variable bundle exposed to template expressions
/// (`spec.md` §3, §4.A). Pure and total given `R`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Environment {
    pub name: String,
    pub payload: String,
    pub uuid: String,
    pub short_uuid: String,
    pub date: String,
}

impl Environment {
    pub fn from_execution_request(request: &ExecutionRequestCrd) -> Self {
        let uuid = request.uid().unwrap_or_default();
        let short_uuid = short_uuid(&uuid);
        let date = request
            .creation_timestamp()
            .map(|time| time.0.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        Self {
            name: request.name_any(),
            payload: request.spec.payload.clone(),
            short_uuid,
            uuid,
            date,
        }
    }
}

/// The prefix of `uuid` up to (not including) the first `-`; `uuid` itself
/// if it contains none.
fn short_uuid(uuid: &str) -> String {
    uuid.split('-').next().unwrap_or(uuid).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_uuid_is_prefix_before_first_dash() {
        assert_eq!(short_uuid("abcd1234-ef56-7890-abcd-ef1234567890"), "abcd1234");
    }

    #[test]
    fn short_uuid_without_dash_is_unchanged() {
        assert_eq!(short_uuid("nodasheshere"), "nodasheshere");
    }
}
