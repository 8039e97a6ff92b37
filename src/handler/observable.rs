//! Observability decorator for job handlers.
//!
//! Wraps an inner [`JobHandler`] by composition: a span per job with
//! the correlation fields, a processed counter, and a duration
//! histogram. Cross-cutting, so it lives outside both the router and
//! the business handler.

use std::sync::Arc;
use std::time::Instant;

use crate::execution::{Job, JobHandler};
use crate::observability::metrics;

/// Decorates a handler with tracing and metrics.
pub struct ObservableHandler {
    inner: Arc<dyn JobHandler>,
}

impl ObservableHandler {
    pub fn new(inner: Arc<dyn JobHandler>) -> Self {
        Self { inner }
    }
}

impl JobHandler for ObservableHandler {
    fn handle(&self, job: Job) {
        let kind = job.kind();
        let span = tracing::info_span!(
            "job.handle",
            kind,
            session_id = job.session_id,
            trace_id = %format_args!("{:032x}", job.trace_ctx.trace_id),
            sampled = job.trace_ctx.is_sampled(),
        );
        let _enter = span.enter();
        let start = Instant::now();

        self.inner.handle(job);

        metrics::record_job(kind, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::JobPayload;
    use crate::observability::TraceContext;
    use std::sync::Mutex;

    struct Counting(Mutex<usize>);

    impl JobHandler for Counting {
        fn handle(&self, _job: Job) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_delegates_to_inner() {
        let inner = Arc::new(Counting(Mutex::new(0)));
        let decorated = ObservableHandler::new(inner.clone());

        decorated.handle(Job {
            session_id: 1,
            trace_ctx: TraceContext::root(true),
            payload: JobPayload::Shutdown,
        });

        assert_eq!(*inner.0.lock().unwrap(), 1);
    }
}
