//! In-process pipeline test: one session's request and response jobs
//! run in order on the same worker thread, no sockets involved.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::thread::ThreadId;
use std::time::Duration;

use url_shortener::data_service::{
    AdapterCallback, DataServiceAdapter, DataServiceRequest, DataServiceResponse,
};
use url_shortener::execution::{Job, JobHandler, JobPayload, JobSink, ShardedPool};
use url_shortener::handler::ShortenerHandler;
use url_shortener::http::{Request, Response, ResponseHandle};
use url_shortener::observability::TraceContext;

/// Resolves every call inline with a canned 201, echoing the payload.
struct ImmediateAdapter;

impl DataServiceAdapter for ImmediateAdapter {
    fn execute(&self, request: DataServiceRequest, callback: AdapterCallback) {
        callback(DataServiceResponse {
            success: true,
            http_status: 201,
            domain_error: None,
            infra_error: None,
            payload: request.payload,
            response: request.response,
        });
    }
}

/// Records which thread handled each job kind, then delegates.
struct ThreadRecorder {
    inner: Arc<ShortenerHandler>,
    seen: Arc<Mutex<Vec<(&'static str, ThreadId)>>>,
}

impl JobHandler for ThreadRecorder {
    fn handle(&self, job: Job) {
        self.seen
            .lock()
            .unwrap()
            .push((job.kind(), std::thread::current().id()));
        self.inner.handle(job);
    }
}

#[test]
fn test_session_jobs_share_one_worker() {
    let shortener = Arc::new(ShortenerHandler::new(Arc::new(ImmediateAdapter), 7));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::new(ThreadRecorder {
        inner: shortener.clone(),
        seen: seen.clone(),
    });
    let pool = Arc::new(ShardedPool::new(2, 16, recorder));
    let sink_arc: Arc<dyn JobSink> = pool.clone();
    let sink: Weak<dyn JobSink> = Arc::downgrade(&sink_arc);
    shortener.bind_response_sink(sink);
    pool.start();

    let sent = Arc::new(Mutex::new(Vec::new()));
    let completions = sent.clone();
    let handle = ResponseHandle::new(Box::new(move |status, _headers, body| {
        completions.lock().unwrap().push((status, body));
    }));

    let request = Request::new(
        "POST",
        "/shorten",
        HashMap::new(),
        br#"{"url": "https://example.com/long"}"#.to_vec(),
    );
    let job = Job {
        session_id: 7,
        trace_ctx: TraceContext::root(false),
        payload: JobPayload::HttpRequest {
            request,
            response: Response::new(&handle),
        },
    };
    assert!(pool.submit(job));

    for _ in 0..100 {
        if !sent.lock().unwrap().is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    // Request job, then the resubmitted response job, on one thread.
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, "http_request");
    assert_eq!(seen[1].0, "backend_response");
    assert_eq!(seen[0].1, seen[1].1, "Both jobs must run on the session's worker");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 201);
    assert!(!sent[0].1.is_empty());

    pool.stop();
}
