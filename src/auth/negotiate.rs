//! HTTP Negotiate protocol middleware.
//!
//! Implements the server side of the HTTP "Negotiate" authentication scheme
//! (RFC 4559) as a tower layer: extract the client token from
//! `Authorization`, advance an acceptor security context one step, and
//! either challenge, reject, or forward the request with the negotiated
//! principal attached.
//!
//! Per request the handshake is a small state machine with five terminal
//! outcomes:
//!
//! - no/malformed `Authorization` header → `401` bare `Negotiate` challenge
//! - token is not valid base64 → `400`
//! - security library rejects the token → `500`, empty body
//! - context needs another round-trip → `401` with the continuation token
//! - context complete → forward to the wrapped service, with the mutual
//!   authentication token (if any) forced onto the final response

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use base64::Engine as _;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderValue, Request, Response, StatusCode};
use tower::{Layer, Service};

use super::{Acceptor, AuthenticatedIdentity, NegotiateStep};
use crate::body::{self, Body};

const NEGOTIATE_PREFIX: &str = "Negotiate ";

/// Tower layer applying [`NegotiateMiddleware`] to a service.
pub struct NegotiateLayer<A> {
    acceptor: Arc<A>,
}

impl<A> NegotiateLayer<A> {
    pub fn new(acceptor: A) -> NegotiateLayer<A> {
        NegotiateLayer {
            acceptor: Arc::new(acceptor),
        }
    }
}

impl<A> Clone for NegotiateLayer<A> {
    fn clone(&self) -> Self {
        NegotiateLayer {
            acceptor: self.acceptor.clone(),
        }
    }
}

impl<S, A> Layer<S> for NegotiateLayer<A> {
    type Service = NegotiateMiddleware<S, A>;

    fn layer(&self, inner: S) -> Self::Service {
        NegotiateMiddleware {
            inner,
            acceptor: self.acceptor.clone(),
        }
    }
}

/// The Negotiate authentication gate wrapping a protected service.
///
/// The wrapped service is invoked only after a completed handshake, and
/// observes the client principal as an [`AuthenticatedIdentity`] request
/// extension.
pub struct NegotiateMiddleware<S, A> {
    inner: S,
    acceptor: Arc<A>,
}

impl<S: Clone, A> Clone for NegotiateMiddleware<S, A> {
    fn clone(&self) -> Self {
        NegotiateMiddleware {
            inner: self.inner.clone(),
            acceptor: self.acceptor.clone(),
        }
    }
}

impl<S, A> NegotiateMiddleware<S, A> {
    pub fn new(inner: S, acceptor: A) -> NegotiateMiddleware<S, A> {
        NegotiateMiddleware {
            inner,
            acceptor: Arc::new(acceptor),
        }
    }
}

impl<S, A> Service<Request<Body>> for NegotiateMiddleware<S, A>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    A: Acceptor,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The clone that replaces `self.inner` keeps the readiness the
        // service signalled in poll_ready.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        // The handshake step itself is synchronous; only the completed
        // branch produces a future that actually suspends.
        let token = match extract_token(req.headers()) {
            Some(token) => token,
            None => return Box::pin(async { Ok(challenge()) }),
        };

        let token = match base64::engine::general_purpose::STANDARD.decode(token) {
            Ok(token) => token,
            Err(e) => {
                log::debug!("{}", crate::error::malformed_token(e));
                return Box::pin(async { Ok(bad_request()) });
            }
        };

        match self.acceptor.accept(&token) {
            Err(e) => {
                // Library detail stays in the log; the wire sees a bare 500.
                log::debug!("security context step failed: {e}");
                Box::pin(async { Ok(internal_error()) })
            }
            Ok(NegotiateStep::Continue { token }) => {
                Box::pin(async move { Ok(continue_challenge(&token)) })
            }
            Ok(NegotiateStep::Complete {
                principal,
                mutual_token,
            }) => {
                log::debug!("negotiation complete for {principal}");
                req.extensions_mut()
                    .insert(AuthenticatedIdentity::new(principal));
                Box::pin(inner.call(req).map(move |result| {
                    result.map(|mut response| {
                        if let Some(token) = mutual_token.filter(|t| !t.is_empty()) {
                            match negotiate_header_value(&token) {
                                // `insert` replaces anything the wrapped handler
                                // put there; the mutual-auth token always wins.
                                Some(value) => {
                                    response.headers_mut().insert(WWW_AUTHENTICATE, value);
                                }
                                None => log::warn!("dropping unencodable mutual-auth token"),
                            }
                        }
                        response
                    })
                }))
            }
        }
    }
}

/// Pull the raw base64 token out of the `Authorization` header.
///
/// The scheme prefix is matched case-sensitively with a single space, per
/// the wire format this gateway has always spoken; anything else counts as
/// "no credential presented".
fn extract_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(NEGOTIATE_PREFIX)
}

fn negotiate_header_value(token: &[u8]) -> Option<HeaderValue> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(token);
    HeaderValue::from_str(&format!("{NEGOTIATE_PREFIX}{encoded}")).ok()
}

/// The challenge-to-start response: `401` with a bare `Negotiate` challenge.
fn challenge() -> Response<Body> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Negotiate"));
    response
}

/// Continuation challenge carrying the server's next handshake leg.
fn continue_challenge(token: &[u8]) -> Response<Body> {
    let value = match negotiate_header_value(token) {
        Some(value) => value,
        None => {
            log::warn!("dropping unencodable continuation token");
            return internal_error();
        }
    };
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response.headers_mut().insert(WWW_AUTHENTICATE, value);
    response
}

fn bad_request() -> Response<Body> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::BAD_REQUEST;
    response
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
