use k8s_openapi::api::batch::v1::JobTemplateSpec as BatchJobTemplateSpec;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Opaque to the reconciler beyond its embedded job-template shape (`spec.md` §3, T).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, CustomResource)]
#[kube(
    group = "dispatcher.example.com",
    version = "v1beta1",
    kind = "JobTemplate",
    root = "JobTemplateCrd",
    shortname = "jt",
    namespaced,
    printcolumn = r#"{
        "name": "created-at",
        "type": "date",
        "description": "created time",
        "jsonPath": ".metadata.creationTimestamp"
    }"#
)]
#[serde(rename_all = "camelCase")]
pub struct JobTemplateSpec {
    pub job_template: BatchJobTemplateSpec,
}
