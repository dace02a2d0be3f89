//! Request path classification.
//!
//! The router decides, before any authentication happens, which of the
//! three surfaces a request belongs to: the credential proxy (ticket
//! acquisition must be reachable unauthenticated), the static bootstrap
//! content, or the protected application behind the Negotiate gate.

use std::path::PathBuf;

use crate::bootstrap;

/// Which surface handles a request, computed purely from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Forward to the external ticket-issuance service, unauthenticated.
    CredentialProxy,
    /// Serve a bootstrap file; `None` means the path was rejected for
    /// escaping the bootstrap root and will answer 404.
    StaticBootstrap(Option<PathBuf>),
    /// Pass through the Negotiate middleware to the protected application.
    ProtectedApp,
}

/// Path classifier for the gateway's three surfaces.
///
/// Mounts are checked in fixed priority order (exact proxy mount before the
/// bootstrap prefix) so overlapping configurations stay deterministic.
#[derive(Debug, Clone, Default)]
pub struct Router {
    proxy_mount: Option<String>,
    bootstrap: Option<BootstrapMount>,
}

#[derive(Debug, Clone)]
struct BootstrapMount {
    prefix: String,
    root: PathBuf,
}

impl Router {
    pub fn new() -> Router {
        Router::default()
    }

    /// Mount the credential proxy at an exact path, e.g. `/KdcProxy`.
    pub fn proxy_mount<S: Into<String>>(mut self, mount: S) -> Router {
        self.proxy_mount = Some(mount.into());
        self
    }

    /// Mount static bootstrap content under a path prefix, e.g. `/login/`,
    /// resolved against `root`.
    pub fn bootstrap_mount<S: Into<String>>(mut self, prefix: S, root: PathBuf) -> Router {
        self.bootstrap = Some(BootstrapMount {
            prefix: prefix.into(),
            root,
        });
        self
    }

    /// Classify a request path into exactly one [`RouteDecision`].
    pub fn route(&self, path: &str) -> RouteDecision {
        if let Some(mount) = &self.proxy_mount {
            if path == mount {
                return RouteDecision::CredentialProxy;
            }
        }

        if let Some(mount) = &self.bootstrap {
            if let Some(remainder) = path.strip_prefix(&mount.prefix) {
                return RouteDecision::StaticBootstrap(bootstrap::resolve(&mount.root, remainder));
            }
        }

        RouteDecision::ProtectedApp
    }
}
