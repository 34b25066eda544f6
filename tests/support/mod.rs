//! Scripted transport shared by the behavior tests.

#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tabula_core::{
    AirtableClient, ClientConfig, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse,
};

pub const API_ROOT: &str = "https://api.airtable.com/v0";
pub const BASE_ID: &str = "appTestBase000001";
pub const API_KEY: &str = "pat-test-token";

type Responder = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync>;

struct Route {
    method: HttpMethod,
    url: String,
    respond: Responder,
}

/// Answers requests by exact method and URL and records every request it
/// sees. Unrouted requests get a vendor-style 404.
pub struct ScriptedHttpClient {
    routes: Vec<Route>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn on(self, method: HttpMethod, url: impl Into<String>, response: HttpResponse) -> Self {
        self.on_with(method, url, move |_| Ok(response.clone()))
    }

    pub fn on_with<F>(mut self, method: HttpMethod, url: impl Into<String>, respond: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, HttpError> + Send + Sync + 'static,
    {
        self.routes.push(Route {
            method,
            url: url.into(),
            respond: Box::new(respond),
        });
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = self
            .routes
            .iter()
            .find(|route| route.method == request.method && route.url == request.url)
            .map(|route| (route.respond)(&request))
            .unwrap_or_else(|| Ok(HttpResponse::new(404, r#"{"error":"NOT_FOUND"}"#)));

        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);

        Box::pin(async move { response })
    }
}

pub fn url(path: &str) -> String {
    format!("{API_ROOT}/{path}")
}

pub fn client_over(http: &Arc<ScriptedHttpClient>) -> AirtableClient {
    AirtableClient::with_http_client(ClientConfig::new(API_KEY), http.clone())
}
