//! Pipeline metrics.
//!
//! Recorded through the `metrics` facade; the HTTP server installs the
//! Prometheus recorder.

use std::time::Duration;

use metrics::{counter, histogram};

pub mod names {
    pub const RENDER_JOBS_TOTAL: &str = "algoviz_render_jobs_total";
    pub const RENDER_JOB_DURATION: &str = "algoviz_render_job_duration_seconds";
    pub const RENDER_STAGE_DURATION: &str = "algoviz_render_stage_duration_seconds";
    pub const CLEANUP_FAILURES_TOTAL: &str = "algoviz_cleanup_failures_total";
}

/// Record a finished job.
pub fn record_job(outcome: &'static str, duration: Duration) {
    counter!(names::RENDER_JOBS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(names::RENDER_JOB_DURATION, "outcome" => outcome).record(duration.as_secs_f64());
}

/// Record how long one stage took.
pub fn record_stage(stage: &'static str, duration: Duration) {
    histogram!(names::RENDER_STAGE_DURATION, "stage" => stage).record(duration.as_secs_f64());
}

pub fn record_cleanup_failure() {
    counter!(names::CLEANUP_FAILURES_TOTAL).increment(1);
}
