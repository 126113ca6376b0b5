pub const NAMESPACE: &str = "default";

pub const LABEL_CONTROLLER_UID: &str = "controller-uid";
pub const LABEL_JOB_EXECUTION_NAME: &str = "job-execution-name";

pub const FINALIZER_NAME: &str = "dispatcher.example.com/finalizer-execution-requests";

pub mod condition_type {
    pub const WAITING: &str = "Waiting";
    pub const RUNNING: &str = "Running";
    pub const SUCCEEDED: &str = "Succeeded";
}

pub mod reason {
    pub const RECONCILING: &str = "Reconciling";
    pub const FETCH_JOB_TEMPLATE_ERROR: &str = "FetchJobTemplateError";
    pub const JOB_CREATED: &str = "JobCreated";
    pub const JOB_RUNNING: &str = "JobRunning";
    pub const JOB_COMPLETED: &str = "JobCompleted";
    pub const JOB_SUCCEEDED: &str = "JobSucceeded";
    pub const JOB_FAILED: &str = "JobFailed";
}

pub mod event_reason {
    pub const CREATED: &str = "Created";
    pub const STARTED: &str = "Started";
    pub const COMPLETED: &str = "Completed";
    pub const FAILED: &str = "Failed";
    pub const JOB_TEMPLATE_NOT_FOUND: &str = "JobTemplateNotFound";
}
