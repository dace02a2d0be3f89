//! Credential proxy pass-through.
//!
//! The gateway does not speak the KDC proxy protocol itself; requests to
//! the proxy mount are forwarded verbatim to a configured upstream service
//! and its response returned untouched.

use http::{Request, Response, StatusCode, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::body::{self, Body};

/// Opaque forwarder to the external ticket-issuance service.
pub struct KdcProxy {
    upstream: Uri,
    client: Client<HttpConnector, Body>,
}

impl KdcProxy {
    /// Build a forwarder that sends every request to `upstream`.
    pub fn new(upstream: Uri) -> KdcProxy {
        let client = Client::builder(TokioExecutor::new()).build_http();
        KdcProxy { upstream, client }
    }

    /// Forward a request to the upstream, method, headers and body intact.
    ///
    /// An unreachable or failing upstream maps to a bare 502; the error
    /// itself only goes to the log.
    pub async fn forward(&self, mut req: Request<Body>) -> Response<Body> {
        *req.uri_mut() = self.upstream.clone();

        match self.client.request(req).await {
            Ok(response) => response.map(body::boxed),
            Err(e) => {
                log::warn!("{}", crate::error::upstream(e));
                let mut response = Response::new(body::empty());
                *response.status_mut() = StatusCode::BAD_GATEWAY;
                response
            }
        }
    }
}
