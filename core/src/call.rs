//! Deferred, cancellable execution of one API request.
//!
//! # Design
//! A `Call` is an inert descriptor: endpoint, headers, optional envelope and
//! optional `Context`. Building one performs no I/O. `request()` renders the
//! wire request as plain data, and `execute()` performs exactly one round
//! trip with it. Nothing is cached, so executing twice sends twice.
//!
//! When a context is attached, `execute()` checks it before sending and then
//! races send+decode against `Context::done()`. If the context wins, the
//! in-flight future is dropped and its error is returned.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::context::Context;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, Transport};
use crate::response::{decode_response, Decode};

pub struct Call<T> {
    transport: Arc<dyn Transport>,
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    payload: Option<Envelope>,
    context: Option<Context>,
    _response: PhantomData<fn() -> T>,
}

impl<T: Decode> Call<T> {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        method: HttpMethod,
        url: String,
        headers: Vec<(String, String)>,
        payload: Option<Envelope>,
    ) -> Self {
        Self {
            transport,
            method,
            url,
            headers,
            payload,
            context: None,
            _response: PhantomData,
        }
    }

    /// Bind the call to a cancellation context.
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    pub fn payload(&self) -> Option<&Envelope> {
        self.payload.as_ref()
    }

    /// Render the request this call sends. Performs no I/O.
    pub fn request(&self) -> Result<HttpRequest, Error> {
        let body = self
            .payload
            .as_ref()
            .map(Envelope::to_body)
            .transpose()
            .map_err(Error::Encode)?;
        Ok(HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body,
        })
    }

    /// Perform one round trip and decode its response.
    pub async fn execute(&self) -> Result<T, Error> {
        let request = self.request()?;

        let Some(context) = &self.context else {
            return self.round_trip(request).await;
        };
        if let Some(err) = context.err() {
            tracing::debug!(url = %self.url, error = %err, "context done before send");
            return Err(err.into());
        }

        tokio::select! {
            biased;
            err = context.done() => {
                tracing::debug!(url = %self.url, error = %err, "call abandoned");
                Err(err.into())
            }
            result = self.round_trip(request) => result,
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<T, Error> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(request).await?;
        tracing::debug!(status = response.status, url = %self.url, "received response");
        decode_response(response).await
    }
}

impl<T> Clone for Call<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            payload: self.payload.clone(),
            context: self.context.clone(),
            _response: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("payload", &self.payload)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}
