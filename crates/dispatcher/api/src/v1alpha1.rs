//! The legacy, flat-`phase` schema (`spec.md` §6, §9). Served alongside the
//! current `v1beta1` typed-conditions schema; `v1beta1` is the storage version.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
    consts::condition_type, consts::reason,
    execution_request::ExecutionRequestStatus as CurrentExecutionRequestStatus,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, CustomResource)]
#[kube(
    group = "dispatcher.example.com",
    version = "v1alpha1",
    kind = "ExecutionRequest",
    root = "ExecutionRequestCrd",
    status = "ExecutionRequestStatus",
    shortname = "er",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequestSpec {
    pub job_template_name: String,
    #[serde(default)]
    pub args: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRequestStatus {
    pub phase: ExecutionRequestPhase,
    #[serde(default)]
    pub job: Option<ObjectReference>,
}

#[derive(
    Copy, Clone, Debug, Default, Display, EnumString, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
pub enum ExecutionRequestPhase {
    Invalid,
    #[default]
    Waiting,
    Active,
    Completed,
    Failed,
}

/// Losslessly maps the legacy flat `phase` onto the current typed-conditions
/// schema, per the table in `spec.md` §9.
impl From<ExecutionRequestStatus> for CurrentExecutionRequestStatus {
    fn from(legacy: ExecutionRequestStatus) -> Self {
        let mut conditions = Vec::new();
        match legacy.phase {
            ExecutionRequestPhase::Invalid => crate::condition::set_unknown(
                &mut conditions,
                condition_type::WAITING,
                None,
                reason::FETCH_JOB_TEMPLATE_ERROR,
                "the referenced job template could not be found",
            ),
            ExecutionRequestPhase::Waiting => crate::condition::set(
                &mut conditions,
                condition_type::WAITING,
                true,
                reason::JOB_CREATED,
                "waiting for the job to start",
            ),
            ExecutionRequestPhase::Active => crate::condition::set(
                &mut conditions,
                condition_type::RUNNING,
                true,
                reason::JOB_RUNNING,
                "the job is running",
            ),
            ExecutionRequestPhase::Completed => crate::condition::set(
                &mut conditions,
                condition_type::SUCCEEDED,
                true,
                reason::JOB_SUCCEEDED,
                "the job succeeded",
            ),
            ExecutionRequestPhase::Failed => crate::condition::set(
                &mut conditions,
                condition_type::SUCCEEDED,
                false,
                reason::JOB_FAILED,
                "the job failed",
            ),
        }

        Self {
            conditions,
            job: legacy.job,
        }
    }
}
