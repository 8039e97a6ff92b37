//! Trie-based route matching and dispatch.
//!
//! # Responsibilities
//! - Map (method, path) to a handler plus extracted path parameters
//! - Dispatch matched requests, answering 404 on a miss
//!
//! # Design Decisions
//! - One trie root per HTTP method; built before traffic starts and
//!   read-only afterwards, so lookups need no locking
//! - A segment starting with `:` declares a named parameter, captured
//!   verbatim
//! - An exact static child is tried before the parametric child, so
//!   static routes strictly shadow parametric ones sharing a prefix
//! - No backtracking across siblings: a dead end at a parametric node
//!   is a non-match. One parametric child per node covers every route
//!   shape this service registers
//! - Trailing slashes are significant: `/x` and `/x/` are distinct
//!   route shapes

use std::collections::HashMap;
use std::sync::Arc;

use crate::http::{Request, Response};

/// A route handler. Receives the request (path parameters already
/// installed) and the response builder.
pub type Handler = Arc<dyn Fn(Request, Response) + Send + Sync>;

/// Result of a successful route match.
pub struct RouteMatch {
    pub handler: Handler,
    pub params: HashMap<String, String>,
}

#[derive(Default)]
struct Node {
    children: HashMap<String, Node>,
    param_child: Option<Box<Node>>,
    param_name: String,
    handler: Option<Handler>,
}

/// Static + parameterized path trie, keyed by method.
#[derive(Default)]
pub struct Router {
    roots: HashMap<String, Node>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method and path pattern. Registering
    /// the same method and path shape twice replaces the earlier
    /// handler.
    pub fn register(&mut self, method: &str, pattern: &str, handler: Handler) {
        let mut node = self.roots.entry(method.to_string()).or_default();
        for segment in split_segments(pattern) {
            if let Some(name) = segment.strip_prefix(':') {
                let child = node.param_child.get_or_insert_with(|| {
                    let mut n = Box::<Node>::default();
                    n.param_name = name.to_string();
                    n
                });
                node = child.as_mut();
            } else {
                node = node.children.entry(segment.to_string()).or_default();
            }
        }
        node.handler = Some(handler);
    }

    pub fn get(&mut self, pattern: &str, handler: Handler) {
        self.register("GET", pattern, handler);
    }

    pub fn post(&mut self, pattern: &str, handler: Handler) {
        self.register("POST", pattern, handler);
    }

    pub fn delete(&mut self, pattern: &str, handler: Handler) {
        self.register("DELETE", pattern, handler);
    }

    pub fn head(&mut self, pattern: &str, handler: Handler) {
        self.register("HEAD", pattern, handler);
    }

    /// Walk the trie segment by segment. Returns the handler and the
    /// captured parameters, or `None` when no route matches.
    pub fn match_route(&self, method: &str, path: &str) -> Option<RouteMatch> {
        let mut node = self.roots.get(method)?;
        let mut params = HashMap::new();

        for segment in split_segments(path) {
            if let Some(child) = node.children.get(segment) {
                node = child;
            } else if let Some(child) = node.param_child.as_deref() {
                params.insert(child.param_name.clone(), segment.to_string());
                node = child;
            } else {
                return None;
            }
        }

        node.handler.as_ref().map(|handler| RouteMatch {
            handler: handler.clone(),
            params,
        })
    }

    /// Match and invoke, or complete the response with 404.
    pub fn dispatch(&self, mut request: Request, mut response: Response) {
        match self.match_route(request.method(), request.path()) {
            Some(m) => {
                request.set_path_params(m.params);
                (m.handler)(request, response);
            }
            None => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.path(),
                    "No route matched"
                );
                response.set_status(404);
                response.write(b"Not Found");
                response.close();
            }
        }
    }
}

/// Split a path into segments, dropping the leading slash but keeping
/// a trailing empty segment so `/x` and `/x/` stay distinct.
fn split_segments(path: &str) -> impl Iterator<Item = &str> + '_ {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}
