pub mod condition;
pub mod consts;
pub mod execution_request;
pub mod job_template;
pub mod v1alpha1;

pub use self::{
    execution_request::{ExecutionRequestCrd, ExecutionRequestSpec, ExecutionRequestStatus},
    job_template::{JobTemplateCrd, JobTemplateSpec},
};
