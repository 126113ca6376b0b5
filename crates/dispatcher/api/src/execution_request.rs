use k8s_openapi::{
    apimachinery::pkg::apis::meta::v1::Condition, api::core::v1::ObjectReference,
};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The current (storage) schema: typed conditions, as described in `spec.md` §3.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, CustomResource)]
#[kube(
    group = "dispatcher.example.com",
    version = "v1beta1",
    kind = "ExecutionRequest",
    root = "ExecutionRequestCrd",
    status = "ExecutionRequestStatus",
    shortname = "er",
    namespaced,
    printcolumn = r#"{
        "name": "template",
        "type": "string",
        "description": "name of the job template",
        "jsonPath": ".spec.templateName"
    }"#,
    printcolumn = r#"{
        "name": "created-at",
        "type": "date",
        "description": "created time",
        "jsonPath": ".metadata.creationTimestamp"
    }"#
)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequestSpec {
    pub template_name: String,
    #[serde(default)]
    pub payload: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequestStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub job: Option<ObjectReference>,
}
