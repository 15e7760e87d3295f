//! HTTP request builders for testing handlers

use actix_web::cookie::Cookie;
use actix_web::http::Method;
use actix_web::test;
use serde_json::Value;

/// Builder for creating HTTP test requests
pub struct RequestBuilder {
    method: Method,
    uri: String,
    cookies: Vec<Cookie<'static>>,
    body: Option<Value>,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: "/".to_string(),
            cookies: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::new().method(Method::GET).uri(uri)
    }

    #[must_use]
    pub fn post(uri: &str) -> Self {
        Self::new().method(Method::POST).uri(uri)
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn uri(mut self, uri: &str) -> Self {
        self.uri = uri.to_string();
        self
    }

    /// Attach a cookie (typically the session cookie)
    #[must_use]
    pub fn cookie(mut self, cookie: Cookie<'static>) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Set a JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Build a `TestRequest` ready for `test::call_service`
    #[must_use]
    pub fn build(self) -> test::TestRequest {
        let mut request = test::TestRequest::with_uri(&self.uri).method(self.method);
        for cookie in self.cookies {
            request = request.cookie(cookie);
        }
        if let Some(body) = self.body {
            request = request.set_json(body);
        }
        request
    }
}
