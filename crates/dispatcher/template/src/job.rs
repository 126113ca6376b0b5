use anyhow::{Context as _, Result};
use dispatcher_api::{
    consts::{LABEL_CONTROLLER_UID, LABEL_JOB_EXECUTION_NAME},
    ExecutionRequestCrd, JobTemplateCrd,
};
use k8s_openapi::api::batch::v1::Job;
use kube::{Resource as _, ResourceExt};

use crate::{environment::Environment, walker};

/// Deep-copies `template`'s embedded job shape, expands it (4.B), and
/// normalises metadata so the result is ready to submit to the cluster
/// (`spec.md` §4.C). Pure: performs no I/O.
pub fn build_job(template: &JobTemplateCrd, request: &ExecutionRequestCrd) -> Result<Job> {
    let env = Environment::from_execution_request(request);
    let expanded = walker::expand(&template.spec.job_template, &env)
        .context("failed to expand job template")?;

    let mut job = Job {
        metadata: expanded.metadata.unwrap_or_default(),
        spec: expanded.spec,
        status: None,
    };

    job.metadata.namespace = template.namespace();

    if job.metadata.name.is_none() && job.metadata.generate_name.is_none() {
        job.metadata.generate_name = Some(format!("{}-", request.name_any()));
    }

    let labels = job.labels_mut();
    labels.insert(LABEL_CONTROLLER_UID.into(), request.uid().unwrap_or_default());
    labels.insert(LABEL_JOB_EXECUTION_NAME.into(), request.name_any());

    if let Some(owner_ref) = request.controller_owner_ref(&()) {
        job.owner_references_mut().push(owner_ref);
    }

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatcher_api::ExecutionRequestSpec;
    use k8s_openapi::{
        api::batch::v1::JobTemplateSpec as BatchJobTemplateSpec,
        apimachinery::pkg::apis::meta::v1::ObjectMeta,
    };

    fn request(name: &str, uid: &str, payload: &str) -> ExecutionRequestCrd {
        let mut request = ExecutionRequestCrd::new(
            name,
            ExecutionRequestSpec {
                template_name: "a-template".into(),
                payload: payload.into(),
            },
        );
        request.meta_mut().uid = Some(uid.into());
        request
    }

    fn template(name: Option<&str>, generate_name: Option<&str>) -> JobTemplateCrd {
        JobTemplateCrd::new(
            "a-template",
            dispatcher_api::JobTemplateSpec {
                job_template: BatchJobTemplateSpec {
                    metadata: Some(ObjectMeta {
                        name: name.map(Into::into),
                        generate_name: generate_name.map(Into::into),
                        ..Default::default()
                    }),
                    spec: None,
                },
            },
        )
    }

    #[test]
    fn assigns_generate_name_when_template_names_neither() {
        let t = template(None, None);
        let r = request("exec-1", "uid-1", "{}");
        let job = build_job(&t, &r).unwrap();
        assert_eq!(job.metadata.generate_name.as_deref(), Some("exec-1-"));
        assert!(job.metadata.name.is_none());
    }

    #[test]
    fn preserves_literal_name_from_template() {
        let t = template(Some("fixed-name"), None);
        let r = request("exec-1", "uid-1", "{}");
        let job = build_job(&t, &r).unwrap();
        assert_eq!(job.metadata.name.as_deref(), Some("fixed-name"));
    }

    #[test]
    fn always_sets_ownership_labels() {
        let t = template(None, None);
        let r = request("exec-1", "uid-123", "{}");
        let job = build_job(&t, &r).unwrap();
        assert_eq!(job.labels().get(LABEL_CONTROLLER_UID).unwrap(), "uid-123");
        assert_eq!(job.labels().get(LABEL_JOB_EXECUTION_NAME).unwrap(), "exec-1");
    }
}
