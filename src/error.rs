//! Error types for the gateway.
//!
//! `Error` is deliberately opaque: the HTTP layer maps error categories to
//! bare status codes, and the underlying security-library message is only
//! ever emitted through `log`, never on the wire.

use std::error::Error as StdError;
use std::fmt;

pub(crate) use crate::body::BoxError;

/// The errors that may occur while accepting a negotiation or serving
/// gateway traffic.
pub struct Error {
    inner: Box<Inner>,
}

struct Inner {
    kind: Kind,
    source: Option<BoxError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Kind {
    /// Acceptor credentials could not be acquired at startup.
    Credentials,
    /// The security library rejected or failed to advance a context.
    Negotiate,
    /// The client presented a token that is not valid base64.
    MalformedToken,
    /// The credential-proxy upstream could not be reached.
    Upstream,
    /// Listener or connection level I/O failure.
    Io,
}

impl Error {
    pub(crate) fn new(kind: Kind, source: Option<BoxError>) -> Error {
        Error {
            inner: Box::new(Inner { kind, source }),
        }
    }

    /// Construct a negotiation-failure error from any underlying cause.
    ///
    /// This is the one public constructor, for [`Acceptor`](crate::Acceptor)
    /// implementations living outside this crate.
    pub fn negotiate<E>(e: E) -> Error
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Error::new(Kind::Negotiate, Some(e.into()))
    }

    /// Returns true if the error came from acquiring acceptor credentials.
    pub fn is_credentials(&self) -> bool {
        matches!(self.inner.kind, Kind::Credentials)
    }

    /// Returns true if the error came from stepping a security context.
    pub fn is_negotiate(&self) -> bool {
        matches!(self.inner.kind, Kind::Negotiate)
    }

    /// Returns true if the error is a malformed client token.
    pub fn is_malformed_token(&self) -> bool {
        matches!(self.inner.kind, Kind::MalformedToken)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("webgss::Error");
        builder.field("kind", &self.inner.kind);
        if let Some(ref source) = self.inner.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Credentials => f.write_str("failed to acquire acceptor credentials")?,
            Kind::Negotiate => f.write_str("security context negotiation failed")?,
            Kind::MalformedToken => f.write_str("malformed negotiation token")?,
            Kind::Upstream => f.write_str("credential proxy upstream request failed")?,
            Kind::Io => f.write_str("i/o error")?,
        }
        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source.as_ref().map(|e| &**e as _)
    }
}

// Constructors used across the crate.

pub(crate) fn credentials<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Credentials, Some(e.into()))
}

pub(crate) fn negotiate<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Negotiate, Some(e.into()))
}

pub(crate) fn malformed_token<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::MalformedToken, Some(e.into()))
}

pub(crate) fn upstream<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Upstream, Some(e.into()))
}

pub(crate) fn io(e: std::io::Error) -> Error {
    Error::new(Kind::Io, Some(Box::new(e)))
}
