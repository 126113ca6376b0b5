use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use dispatcher_api::{
    condition,
    consts::{condition_type, event_reason, reason},
    ExecutionRequestCrd, ExecutionRequestStatus, JobTemplateCrd,
};
use dispatcher_core_k8s::manager::Manager;
use k8s_openapi::api::batch::v1::Job;
use kube::{
    api::{Patch, PatchParams},
    runtime::controller::Action,
    Api, Client, CustomResourceExt, Error, Resource as _, ResourceExt,
};
use serde_json::json;
use tracing::{info, instrument, Level};

use crate::{error::ReconcileError, events, metrics, project};

const STEADY_STATE_POLL_SECONDS_DEFAULT: u64 = 15;

#[derive(Default)]
pub struct Ctx {}

#[async_trait]
impl ::dispatcher_core_k8s::manager::Ctx for Ctx {
    type Data = ExecutionRequestCrd;

    const NAME: &'static str = crate::consts::NAME;
    const NAMESPACE: &'static str = ::dispatcher_api::consts::NAMESPACE;

    #[instrument(level = Level::INFO, skip_all, fields(name = %data.name_any(), namespace = data.namespace()), err(Display))]
    async fn reconcile(
        manager: Arc<Manager<Self>>,
        data: Arc<<Self as ::dispatcher_core_k8s::manager::Ctx>::Data>,
    ) -> Result<Action, Error>
    where
        Self: Sized,
    {
        reconcile(manager.kube.clone(), &data).await.map_err(Into::into)
    }
}

/// Component D of `spec.md` §4.D. `data` is the request R as last observed
/// by the watch; every branch re-derives its decision from `data.status`
/// rather than re-fetching, per the "at most one call per key is in
/// flight" guarantee §5 affords.
async fn reconcile(kube: Client, data: &ExecutionRequestCrd) -> Result<Action, ReconcileError> {
    let namespace = data.namespace().unwrap_or_default();
    let name = data.name_any();
    let api = Api::<ExecutionRequestCrd>::namespaced(kube.clone(), &namespace);

    let mut status = data.status.clone().unwrap_or_default();

    if status.conditions.is_empty() {
        condition::set_unknown(
            &mut status.conditions,
            condition_type::WAITING,
            None,
            reason::RECONCILING,
            "reconciling execution request",
        );
        persist_status(&api, &name, &status)
            .await
            .map_err(|error| ReconcileError::Transient(error.into()))?;
        return Ok(Action::requeue(Duration::ZERO));
    }

    let template_api = Api::<JobTemplateCrd>::namespaced(kube.clone(), &namespace);
    let template = match template_api.get_opt(&data.spec.template_name).await {
        Ok(Some(template)) => template,
        Ok(None) => {
            let message = format!("job template {:?} not found", data.spec.template_name);
            condition::set_unknown(
                &mut status.conditions,
                condition_type::WAITING,
                None,
                reason::FETCH_JOB_TEMPLATE_ERROR,
                &message,
            );
            persist_status(&api, &name, &status)
                .await
                .map_err(|error| ReconcileError::Transient(error.into()))?;
            events::emit_warning(&kube, data, event_reason::JOB_TEMPLATE_NOT_FOUND, &message).await;
            return Err(ReconcileError::Reference {
                name: data.spec.template_name.clone(),
                source: anyhow!(message),
            });
        }
        Err(error) => return Err(ReconcileError::Transient(error.into())),
    };

    let job_api = Api::<Job>::namespaced(kube.clone(), &namespace);
    let owned_job = match status.job.as_ref().and_then(|job_ref| job_ref.name.as_deref()) {
        Some(job_name) => job_api
            .get_opt(job_name)
            .await
            .map_err(|error| ReconcileError::Transient(error.into()))?,
        None => None,
    };

    match owned_job {
        None => {
            if condition::is_false(&status.conditions, condition_type::RUNNING) {
                // The job was running and is now gone: terminal cleanup (§4.D, §8 invariant 2).
                api.delete(&name, &Default::default())
                    .await
                    .map_err(|error| ReconcileError::Transient(error.into()))?;
                info!("deleted execution request {namespace}/{name} after its job disappeared");
                return Ok(Action::await_change());
            }

            create_job(&kube, &job_api, &api, &template, data, &name, &mut status).await
        }
        Some(job) => {
            let job_status = job.status.unwrap_or_default();
            let effects = project::project_job_status(&mut status, &job_status);
            persist_status(&api, &name, &status)
                .await
                .map_err(|error| ReconcileError::Transient(error.into()))?;

            for effect in effects {
                apply_effect(&kube, data, effect).await;
            }

            let poll_interval = ::dispatcher_core::env::infer_or(
                "RECONCILE_INTERVAL_SECONDS",
                STEADY_STATE_POLL_SECONDS_DEFAULT,
            );
            Ok(Action::requeue(Duration::from_secs(poll_interval)))
        }
    }
}

async fn create_job(
    kube: &Client,
    job_api: &Api<Job>,
    api: &Api<ExecutionRequestCrd>,
    template: &JobTemplateCrd,
    request: &ExecutionRequestCrd,
    name: &str,
    status: &mut ExecutionRequestStatus,
) -> Result<Action, ReconcileError> {
    let job = dispatcher_template::build_job(template, request)
        .map_err(ReconcileError::TemplateExpansion)?;

    let created = job_api
        .create(&Default::default(), &job)
        .await
        .map_err(|error| ReconcileError::Transient(error.into()))?;

    condition::set(
        &mut status.conditions,
        condition_type::WAITING,
        true,
        reason::JOB_CREATED,
        "the job was created",
    );
    status.job = Some(created.object_ref(&()));

    persist_status(api, name, status)
        .await
        .map_err(|error| ReconcileError::Transient(error.into()))?;

    events::emit_normal(kube, request, event_reason::CREATED, "the job was created").await;
    metrics::record_job_created();

    Ok(Action::requeue(Duration::ZERO))
}

async fn apply_effect(kube: &Client, request: &ExecutionRequestCrd, effect: project::Effect) {
    match effect {
        project::Effect::EmitNormal(reason, note) => events::emit_normal(kube, request, reason, note).await,
        project::Effect::EmitWarning(reason, note) => events::emit_warning(kube, request, reason, note).await,
        project::Effect::RecordSuccess => metrics::record_job_succeeded(),
        project::Effect::RecordFailure => metrics::record_job_failed(),
    }
}

async fn persist_status(
    api: &Api<ExecutionRequestCrd>,
    name: &str,
    status: &ExecutionRequestStatus,
) -> kube::Result<ExecutionRequestCrd> {
    let crd = ExecutionRequestCrd::api_resource();
    let patch = Patch::Merge(json!({
        "apiVersion": crd.api_version,
        "kind": crd.kind,
        "status": status,
    }));
    let pp = PatchParams::apply(crate::consts::NAME);
    api.patch_status(name, &pp, &patch).await
}
