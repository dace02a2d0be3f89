//! GSS-API acceptor backend.
//!
//! Wraps `libgssapi` behind the [`Acceptor`](super::Acceptor) seam. The
//! acceptor credentials (keytab-backed, typically selected with
//! `KRB5_KTNAME`) are acquired once at startup and shared read-only by
//! every request; each request that carries a token gets a fresh
//! `ServerCtx` that is dropped when the request finishes.

use libgssapi::context::{SecurityContext, ServerCtx};
use libgssapi::credential::{Cred, CredUsage};
use libgssapi::name::Name;
use libgssapi::oid::{OidSet, GSS_MECH_KRB5, GSS_NT_HOSTBASED_SERVICE};

use super::{Acceptor, NegotiateStep};

/// The process-wide acceptor identity.
///
/// Must outlive every in-flight request; failure to acquire it is fatal at
/// startup, never per-request.
pub struct ServerCredentials {
    cred: Cred,
}

impl ServerCredentials {
    /// Acquire default acceptor credentials from the environment
    /// (the keytab named by `KRB5_KTNAME`, default principal).
    pub fn acquire() -> crate::Result<ServerCredentials> {
        let cred = Cred::acquire(None, None, CredUsage::Accept, None)
            .map_err(crate::error::credentials)?;
        Ok(ServerCredentials { cred })
    }

    /// Acquire acceptor credentials for a specific service name, e.g.
    /// `HTTP@www.example.com` (GSS hostbased-service form).
    pub fn acquire_for_service(service: &str) -> crate::Result<ServerCredentials> {
        let name = Name::new(service.as_bytes(), Some(&GSS_NT_HOSTBASED_SERVICE))
            .map_err(crate::error::credentials)?;
        let name = name
            .canonicalize(Some(&GSS_MECH_KRB5))
            .map_err(crate::error::credentials)?;

        let mut mechs = OidSet::new().map_err(crate::error::credentials)?;
        mechs
            .add(&GSS_MECH_KRB5)
            .map_err(crate::error::credentials)?;

        let cred = Cred::acquire(Some(&name), None, CredUsage::Accept, Some(&mechs))
            .map_err(crate::error::credentials)?;
        Ok(ServerCredentials { cred })
    }
}

/// [`Acceptor`](super::Acceptor) backed by the system GSS-API library.
pub struct GssAcceptor {
    credentials: ServerCredentials,
}

impl GssAcceptor {
    pub fn new(credentials: ServerCredentials) -> GssAcceptor {
        GssAcceptor { credentials }
    }
}

impl Acceptor for GssAcceptor {
    fn accept(&self, token: &[u8]) -> crate::Result<NegotiateStep> {
        let mut ctx = ServerCtx::new(self.credentials.cred.clone());
        let output = ctx.step(token).map_err(crate::error::negotiate)?;

        if ctx.is_complete() {
            let principal = ctx
                .source_name()
                .map_err(crate::error::negotiate)?
                .to_string();
            Ok(NegotiateStep::Complete {
                principal,
                mutual_token: output.map(|buf| buf.to_vec()),
            })
        } else {
            // An incomplete context that produced nothing to send back can
            // never make progress; surface it as a negotiation failure.
            let token = output
                .map(|buf| buf.to_vec())
                .ok_or_else(|| crate::error::negotiate("incomplete context produced no token"))?;
            Ok(NegotiateStep::Continue { token })
        }
    }
}
