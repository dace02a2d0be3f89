//! `webgss` is an HTTP authentication gateway speaking the Negotiate
//! (Kerberos/SPNEGO) scheme, RFC 4559.
//!
//! A request flows through three statically composed stages:
//!
//! 1. [`Router`] classifies the path. The credential-proxy mount and the
//!    static bootstrap prefix are served without authentication, so a
//!    client can fetch the login page and acquire a ticket first.
//! 2. [`NegotiateMiddleware`] runs the SPNEGO handshake over
//!    `Authorization` / `WWW-Authenticate` headers against an
//!    [`Acceptor`] and gates the protected application.
//! 3. The protected application observes the negotiated principal as an
//!    [`AuthenticatedIdentity`] request extension.
//!
//! The GSS-API backend ([`auth::gssapi`]) is behind the `gssapi` cargo
//! feature; the middleware itself only needs an [`Acceptor`], which keeps
//! the protocol logic testable without a KDC.
//!
//! ```no_run
//! use std::convert::Infallible;
//! use http::{Request, Response};
//! use webgss::body::{self, Body};
//! use webgss::{AuthenticatedIdentity, Gateway};
//!
//! # async fn run() -> Result<(), webgss::Error> {
//! # #[cfg(feature = "gssapi")] {
//! use webgss::auth::gssapi::{GssAcceptor, ServerCredentials};
//!
//! let credentials = ServerCredentials::acquire()?;
//! let app = tower::service_fn(|req: Request<Body>| async move {
//!     let user = req
//!         .extensions()
//!         .get::<AuthenticatedIdentity>()
//!         .map(|id| id.as_str().to_owned())
//!         .unwrap_or_default();
//!     Ok::<_, Infallible>(Response::new(body::full(format!("Hello {user}!\n"))))
//! });
//!
//! let gateway = Gateway::builder(GssAcceptor::new(credentials), app)
//!     .kdc_proxy("/KdcProxy", "http://127.0.0.1:8089/KdcProxy".parse().unwrap())
//!     .login_dir("/login/", "/srv/webgss/login".into())
//!     .build();
//!
//! webgss::serve("127.0.0.1:8080".parse().unwrap(), gateway).await?;
//! # }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod body;
pub mod bootstrap;
mod error;
pub mod proxy;
pub mod routing;
pub mod server;

pub use auth::{Acceptor, AuthenticatedIdentity, NegotiateLayer, NegotiateMiddleware, NegotiateStep};
pub use body::{Body, BoxError};
pub use error::Error;
pub use proxy::KdcProxy;
pub use routing::{RouteDecision, Router};
pub use server::{serve, Gateway, GatewayBuilder};

/// A `Result` alias where the `Err` case is `webgss::Error`.
pub type Result<T> = std::result::Result<T, Error>;
