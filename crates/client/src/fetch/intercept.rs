//! Request interception in front of the network.
//!
//! Interceptors are consulted in registration order; the first one that
//! accepts a request answers it. Requests nobody accepts go to the network
//! untouched.

use super::{HttpFetch, HttpRequest, HttpResponse};
use async_trait::async_trait;
use showcase_core::Error;
use std::sync::Arc;

/// A handler that can take over selected requests.
///
/// `intercept` always produces a response; an interceptor that cannot
/// reach anything still has to answer.
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn accepts(&self, request: &HttpRequest) -> bool;

    async fn intercept(&self, request: &HttpRequest) -> HttpResponse;
}

/// An `HttpFetch` that routes through registered interceptors.
#[derive(Clone)]
pub struct InterceptingClient {
    network: Arc<dyn HttpFetch>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptingClient {
    pub fn new(network: Arc<dyn HttpFetch>) -> Self {
        Self { network, interceptors: Vec::new() }
    }

    pub fn register(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn with(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.register(interceptor);
        self
    }
}

#[async_trait]
impl HttpFetch for InterceptingClient {
    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        if let Some(interceptor) = self.interceptors.iter().find(|i| i.accepts(request)) {
            return Ok(interceptor.intercept(request).await);
        }
        self.network.fetch(request).await
    }
}
