//! The pure half of the `J observed` branch of `spec.md` §4.D: projecting a
//! Job's status onto an `ExecutionRequest`'s conditions. Kept free of I/O so
//! §8's scenarios (a), (b) and (f) can be exercised as fixture tests.

use dispatcher_api::{
    condition,
    consts::{condition_type, event_reason, reason},
    ExecutionRequestStatus,
};
use k8s_openapi::api::batch::v1::JobStatus;

/// A side effect the caller (I/O-capable) should perform after the status
/// mutation lands. Kept separate from the mutation itself so the decision
/// logic stays pure and the "exactly once per terminal transition" rule
/// (§6) can be tested without a fake clock or event sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    EmitNormal(&'static str, &'static str),
    EmitWarning(&'static str, &'static str),
    RecordSuccess,
    RecordFailure,
}

/// Mutates `status.conditions` according to `job_status` and returns the
/// effects to perform exactly once, on first observation of each
/// transition. Idempotent: re-running with the same `job_status` against
/// the already-mutated `status` returns no effects.
pub fn project_job_status(status: &mut ExecutionRequestStatus, job_status: &JobStatus) -> Vec<Effect> {
    let complete = has_condition_true(job_status, "Complete");
    // `Complete=True` wins if both are pathologically present (spec.md §4.D tie-break).
    let failed = !complete && has_condition_true(job_status, "Failed");

    if complete {
        let mut effects = Vec::new();
        if !condition::is_true(&status.conditions, condition_type::SUCCEEDED) {
            effects.push(Effect::EmitNormal(event_reason::COMPLETED, "the job succeeded"));
            effects.push(Effect::RecordSuccess);
        }
        condition::set(
            &mut status.conditions,
            condition_type::SUCCEEDED,
            true,
            reason::JOB_SUCCEEDED,
            "the job succeeded",
        );
        condition::set(
            &mut status.conditions,
            condition_type::RUNNING,
            false,
            reason::JOB_COMPLETED,
            "the job has finished",
        );
        effects
    } else if failed {
        let mut effects = Vec::new();
        if !condition::is_false(&status.conditions, condition_type::SUCCEEDED) {
            effects.push(Effect::EmitWarning(event_reason::FAILED, "the job failed"));
            effects.push(Effect::RecordFailure);
        }
        condition::set(
            &mut status.conditions,
            condition_type::SUCCEEDED,
            false,
            reason::JOB_FAILED,
            "the job failed",
        );
        condition::set(
            &mut status.conditions,
            condition_type::RUNNING,
            false,
            reason::JOB_COMPLETED,
            "the job has finished",
        );
        effects
    } else if job_status.start_time.is_some() {
        let mut effects = Vec::new();
        if !condition::is_true(&status.conditions, condition_type::RUNNING) {
            effects.push(Effect::EmitNormal(event_reason::STARTED, "the job started running"));
        }
        condition::set(
            &mut status.conditions,
            condition_type::WAITING,
            false,
            reason::JOB_RUNNING,
            "the job is running",
        );
        condition::set(
            &mut status.conditions,
            condition_type::RUNNING,
            true,
            reason::JOB_RUNNING,
            "the job is running",
        );
        effects
    } else {
        Vec::new()
    }
}

fn has_condition_true(job_status: &JobStatus, type_: &str) -> bool {
    job_status
        .conditions
        .iter()
        .flatten()
        .any(|condition| condition.type_ == type_ && condition.status == "True")
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::{api::batch::v1::JobCondition, apimachinery::pkg::apis::meta::v1::Time};
    use chrono::Utc;

    fn job_condition(type_: &str, status: &str) -> JobCondition {
        JobCondition {
            type_: type_.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    #[test]
    fn start_time_sets_running_and_emits_started_once() {
        let mut status = ExecutionRequestStatus::default();
        let job_status = JobStatus {
            start_time: Some(Time(Utc::now())),
            ..Default::default()
        };

        let effects = project_job_status(&mut status, &job_status);
        assert_eq!(effects, vec![Effect::EmitNormal(event_reason::STARTED, "the job started running")]);
        assert!(condition::is_true(&status.conditions, condition_type::RUNNING));

        // Re-observing the same status is a no-op for effects (§8 invariant 5).
        let effects = project_job_status(&mut status, &job_status);
        assert!(effects.is_empty());
    }

    #[test]
    fn complete_sets_succeeded_true_and_records_once() {
        let mut status = ExecutionRequestStatus::default();
        let job_status = JobStatus {
            conditions: Some(vec![job_condition("Complete", "True")]),
            ..Default::default()
        };

        let effects = project_job_status(&mut status, &job_status);
        assert_eq!(effects, vec![Effect::EmitNormal(event_reason::COMPLETED, "the job succeeded"), Effect::RecordSuccess]);
        assert!(condition::is_true(&status.conditions, condition_type::SUCCEEDED));
        assert!(condition::is_false(&status.conditions, condition_type::RUNNING));

        let effects = project_job_status(&mut status, &job_status);
        assert!(effects.is_empty());
    }

    #[test]
    fn failed_sets_succeeded_false_and_records_once() {
        let mut status = ExecutionRequestStatus::default();
        let job_status = JobStatus {
            conditions: Some(vec![job_condition("Failed", "True")]),
            ..Default::default()
        };

        let effects = project_job_status(&mut status, &job_status);
        assert_eq!(effects, vec![Effect::EmitWarning(event_reason::FAILED, "the job failed"), Effect::RecordFailure]);
        assert!(condition::is_false(&status.conditions, condition_type::SUCCEEDED));

        let effects = project_job_status(&mut status, &job_status);
        assert!(effects.is_empty());
    }

    #[test]
    fn complete_and_failed_both_true_lets_complete_win() {
        let mut status = ExecutionRequestStatus::default();
        let job_status = JobStatus {
            conditions: Some(vec![job_condition("Complete", "True"), job_condition("Failed", "True")]),
            ..Default::default()
        };

        project_job_status(&mut status, &job_status);
        assert!(condition::is_true(&status.conditions, condition_type::SUCCEEDED));
    }
}
