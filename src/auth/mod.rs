//! Server-side HTTP Negotiate (Kerberos/SPNEGO) authentication.
//!
//! The middleware in [`negotiate`] speaks the RFC 4559 header contract and
//! is generic over an [`Acceptor`], the thin seam to the security library.
//! The real GSS-API backend lives in [`gssapi`] behind the `gssapi` cargo
//! feature; tests drive the middleware with an in-memory acceptor instead.

#[cfg(feature = "gssapi")]
pub mod gssapi;

mod negotiate;

pub use negotiate::{NegotiateLayer, NegotiateMiddleware};

use std::fmt;
use std::sync::Arc;

/// Outcome of advancing a fresh acceptor security context by one step.
#[derive(Debug)]
pub enum NegotiateStep {
    /// The handshake finished in this round-trip.
    Complete {
        /// The negotiated client principal, e.g. `alice@EXAMPLE.COM`.
        principal: String,
        /// Optional final server-to-client token proving the server's own
        /// identity (mutual authentication).
        mutual_token: Option<Vec<u8>>,
    },
    /// The handshake needs another round-trip; `token` must be sent back
    /// to the client as a continuation challenge.
    Continue { token: Vec<u8> },
}

/// The seam between the HTTP middleware and the security library.
///
/// Implementations accept one decoded client token against the process-wide
/// acceptor credentials, using a context that lives no longer than the call:
/// negotiation state across round-trips is carried entirely by the tokens.
pub trait Acceptor: Send + Sync + 'static {
    /// Advance a fresh acceptor context with the client's token.
    ///
    /// Any security-library failure (expired ticket, bad signature, wrong
    /// acceptor, replay, clock skew) is reported as an error; the caller is
    /// responsible for keeping its detail off the wire.
    fn accept(&self, token: &[u8]) -> crate::Result<NegotiateStep>;
}

impl<A: Acceptor + ?Sized> Acceptor for Arc<A> {
    fn accept(&self, token: &[u8]) -> crate::Result<NegotiateStep> {
        (**self).accept(token)
    }
}

/// The principal negotiated by a completed handshake.
///
/// Inserted into the request extensions by the middleware only after the
/// security context reports completion; downstream handlers treat it as the
/// authoritative client identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedIdentity(Arc<str>);

impl AuthenticatedIdentity {
    pub(crate) fn new<S: Into<Arc<str>>>(principal: S) -> AuthenticatedIdentity {
        AuthenticatedIdentity(principal.into())
    }

    /// The principal name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthenticatedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
