//! Scripted network used by unit tests.

use crate::fetch::{HttpFetch, HttpRequest, HttpResponse};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use showcase_core::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Status(u16, &'static [u8]),
    Fail,
    TooLarge,
    Hang,
}

#[derive(Debug)]
pub(crate) struct StubNetwork {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub(crate) fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self { reply: Mutex::new(reply), calls: AtomicUsize::new(0) })
    }

    pub(crate) fn set(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpFetch for StubNetwork {
    async fn fetch(&self, _request: &HttpRequest) -> Result<HttpResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.reply.lock().unwrap().clone();
        match reply {
            Reply::Status(status, body) => {
                Ok(HttpResponse::new(StatusCode::from_u16(status).unwrap(), Bytes::from_static(body)))
            }
            Reply::Fail => Err(Error::HttpError("network error: connection refused".into())),
            Reply::TooLarge => Err(Error::FetchTooLarge("209715201 bytes exceeds 209715200".into())),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                Err(Error::HttpError("unreachable".into()))
            }
        }
    }
}
