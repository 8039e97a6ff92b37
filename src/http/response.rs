//! Response completion that survives thread handoff.
//!
//! # Responsibilities
//! - Complete an HTTP response exactly once, from whichever thread and
//!   code path gets there first
//! - Silently drop writes after the connection is gone or the response
//!   was already sent (the peer may have torn the stream down)
//! - Release scoped resources (e.g. the admission guard) no matter how
//!   the response ends: success, error, or client disconnect
//!
//! # Design Decisions
//! - The transport holds the one strong `Arc<ResponseHandle>` tied to
//!   the live connection; everything downstream holds weak references,
//!   so a disconnect can never be a use-after-free
//! - The closed flag is atomic and checked with `swap`, making the
//!   send path race-free without a lock around the transport call

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// The function that flushes status, headers, and body to the wire.
pub type SendFn = Box<dyn FnOnce(u16, Vec<(String, String)>, Vec<u8>) + Send>;

/// Reference-counted completion object for one HTTP exchange.
pub struct ResponseHandle {
    send_fn: Mutex<Option<SendFn>>,
    alive: AtomicBool,
    closed: AtomicBool,
    resources: Mutex<Vec<Box<dyn Any + Send>>>,
}

impl ResponseHandle {
    pub fn new(send_fn: SendFn) -> Arc<Self> {
        Arc::new(Self {
            send_fn: Mutex::new(Some(send_fn)),
            alive: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            resources: Mutex::new(Vec::new()),
        })
    }

    /// Flush the response. The first call wins; later calls are no-ops.
    /// Skips the transport entirely when the connection is gone.
    pub fn send(&self, status: u16, headers: Vec<(String, String)>, body: Vec<u8>) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let send_fn = self
            .send_fn
            .lock()
            .expect("response handle send_fn mutex poisoned")
            .take();
        if self.alive.load(Ordering::SeqCst) {
            if let Some(f) = send_fn {
                f(status, headers, body);
            }
        }
        self.release_resources();
    }

    /// Record that the peer connection is gone. All further `send`
    /// calls become no-ops; scoped resources are released now.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.send_fn
                .lock()
                .expect("response handle send_fn mutex poisoned")
                .take();
            self.release_resources();
        }
    }

    /// Whether the exchange can still be completed.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    /// Attach a resource released when the response completes or the
    /// handle is destroyed (RAII tokens such as the admission guard).
    pub fn attach_resource(&self, resource: Box<dyn Any + Send>) {
        self.resources
            .lock()
            .expect("response handle resource mutex poisoned")
            .push(resource);
    }

    fn release_resources(&self) {
        self.resources
            .lock()
            .expect("response handle resource mutex poisoned")
            .clear();
    }
}

/// A thin, copyable response builder handed to handlers.
///
/// Holds only a weak reference to the [`ResponseHandle`]; every
/// mutating call first checks `is_alive`, and `close` delegates the
/// once-only guarantee to the handle's atomic flag.
#[derive(Clone, Default)]
pub struct Response {
    handle: Weak<ResponseHandle>,
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Response {
    pub fn new(handle: &Arc<ResponseHandle>) -> Self {
        Self {
            handle: Arc::downgrade(handle),
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn set_status(&mut self, status: u16) {
        if self.is_alive() {
            self.status = status;
        }
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        if self.is_alive() {
            self.headers.push((name.into(), value.into()));
        }
    }

    pub fn write(&mut self, bytes: &[u8]) {
        if self.is_alive() {
            self.body.extend_from_slice(bytes);
        }
    }

    /// Complete the response. A no-op if the connection is gone or a
    /// copy of this response already closed it.
    pub fn close(self) {
        if let Some(handle) = self.handle.upgrade() {
            handle.send(self.status, self.headers, self.body);
        }
    }

    pub fn is_alive(&self) -> bool {
        self.handle
            .upgrade()
            .map(|h| h.is_alive())
            .unwrap_or(false)
    }

    /// Attach a scoped resource to the underlying handle.
    pub fn attach_resource(&self, resource: Box<dyn Any + Send>) {
        if let Some(handle) = self.handle.upgrade() {
            handle.attach_resource(resource);
        }
    }
}
