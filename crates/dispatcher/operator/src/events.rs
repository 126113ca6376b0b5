//! Thin wrapper over `kube::runtime::events::Recorder` for the `Normal`/
//! `Warning` events of `spec.md` §6. Emission is always best-effort per
//! §4.D's tie-break rule: a failure to record an event never aborts
//! reconciliation.

use dispatcher_api::ExecutionRequestCrd;
use kube::{
    runtime::events::{Event, EventType, Recorder, Reporter},
    Client, Resource as _, ResourceExt as _,
};
use tracing::warn;

const CONTROLLER: &str = "dispatcher-operator";

pub async fn emit_normal(kube: &Client, request: &ExecutionRequestCrd, reason: &str, note: &str) {
    emit(kube, request, EventType::Normal, reason, note).await
}

pub async fn emit_warning(kube: &Client, request: &ExecutionRequestCrd, reason: &str, note: &str) {
    emit(kube, request, EventType::Warning, reason, note).await
}

async fn emit(kube: &Client, request: &ExecutionRequestCrd, type_: EventType, reason: &str, note: &str) {
    let reporter = Reporter::from(CONTROLLER);
    let reference = request.object_ref(&());
    let recorder = Recorder::new(kube.clone(), reporter, reference);

    let event = Event {
        type_,
        reason: reason.into(),
        note: Some(note.into()),
        action: reason.into(),
        secondary: None,
    };

    if let Err(error) = recorder.publish(event).await {
        warn!("failed to emit {reason} event for {:?}: {error}", request.name_any());
    }
}
