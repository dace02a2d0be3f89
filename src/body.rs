//! The unified response/request body type used throughout the gateway.
//!
//! Every branch of the gateway (challenge responses, proxied upstream
//! responses, streamed static files, protected-app responses) is normalized
//! into one boxed body so the routing and middleware services compose.

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};

/// The boxed error type carried by [`Body`] frames.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A boxed HTTP body carrying `Bytes` frames.
pub type Body = BoxBody<Bytes, BoxError>;

/// An empty body, used by all challenge and error responses.
pub fn empty() -> Body {
    Empty::new().map_err(|never| match never {}).boxed()
}

/// A body holding a single in-memory chunk.
pub fn full<B: Into<Bytes>>(chunk: B) -> Body {
    Full::new(chunk.into()).map_err(|never| match never {}).boxed()
}

/// Box any compatible body, erasing its concrete type.
pub fn boxed<B>(body: B) -> Body
where
    B: http_body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed()
}
