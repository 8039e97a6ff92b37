//! Protocol-agnostic request view.
//!
//! # Responsibilities
//! - Expose method, path, headers, body
//! - Hold path parameters (populated by the router before dispatch)
//!   and query parameters (parsed at construction)
//!
//! # Design Decisions
//! - Header names are stored lowercase for case-insensitive lookup
//! - Parameter values are captured verbatim, with no type coercion or
//!   validation; the handler owns interpretation

use std::collections::HashMap;

/// An inbound request, decoupled from the wire transport.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: Vec<u8>,
    path_params: HashMap<String, String>,
    query_params: HashMap<String, String>,
}

impl Request {
    /// Build a request from its transport-level parts. `target` is the
    /// path with an optional query string.
    pub fn new(
        method: impl Into<String>,
        target: &str,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, q),
            None => (target, ""),
        };
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Self {
            method: method.into(),
            path: path.to_string(),
            headers,
            body,
            path_params: HashMap::new(),
            query_params: parse_query(query),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Install the parameters captured by the router. Called once,
    /// between match and handler invocation.
    pub fn set_path_params(&mut self, params: HashMap<String, String>) {
        self.path_params = params;
    }
}

fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(target: &str) -> Request {
        Request::new("GET", target, HashMap::new(), Vec::new())
    }

    #[test]
    fn test_splits_query_from_path() {
        let r = req("/abc123?utm=mail&flag");
        assert_eq!(r.path(), "/abc123");
        assert_eq!(r.query_param("utm"), Some("mail"));
        assert_eq!(r.query_param("flag"), Some(""));
        assert_eq!(r.query_param("missing"), None);
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        let r = Request::new("POST", "/shorten", headers, b"{}".to_vec());
        assert_eq!(r.header("content-type"), Some("application/json"));
        assert_eq!(r.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_path_params_installed_by_router() {
        let mut r = req("/abc123");
        let mut params = HashMap::new();
        params.insert("code".to_string(), "abc123".to_string());
        r.set_path_params(params);
        assert_eq!(r.path_param("code"), Some("abc123"));
    }
}
