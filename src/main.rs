//! The `webgss` server binary.
//!
//! Run with the acceptor keytab selected through the usual Kerberos
//! environment, e.g.:
//!
//! ```text
//! KRB5_KTNAME=/etc/krb5.keytab WEBGSS_LOGIN_DIR=./login webgss
//! ```
//!
//! Configuration (all via environment):
//! - `WEBGSS_LISTEN`        bind address, default `127.0.0.1:8080`
//! - `WEBGSS_SERVICE`       acceptor service name (`HTTP@host`); default
//!                          credentials are used when unset
//! - `WEBGSS_KDC_PROXY_URL` upstream for the `/KdcProxy` mount (off if unset)
//! - `WEBGSS_LOGIN_DIR`     root for the `/login/` bootstrap mount (off if unset)

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;

use http::header::CONTENT_TYPE;
use http::{HeaderValue, Request, Response};

use webgss::auth::gssapi::{GssAcceptor, ServerCredentials};
use webgss::body::{self, Body};
use webgss::{AuthenticatedIdentity, Gateway};

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listen: SocketAddr = std::env::var("WEBGSS_LISTEN")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_owned())
        .parse()?;

    // Credential acquisition failure is fatal here, never per-request.
    let credentials = match std::env::var("WEBGSS_SERVICE") {
        Ok(service) => ServerCredentials::acquire_for_service(&service)?,
        Err(_) => ServerCredentials::acquire()?,
    };

    let mut builder = Gateway::builder(GssAcceptor::new(credentials), tower::service_fn(hello));

    if let Ok(upstream) = std::env::var("WEBGSS_KDC_PROXY_URL") {
        builder = builder.kdc_proxy("/KdcProxy", upstream.parse()?);
    }
    if let Ok(dir) = std::env::var("WEBGSS_LOGIN_DIR") {
        builder = builder.login_dir("/login/", PathBuf::from(dir));
    }

    webgss::serve(listen, builder.build()).await?;
    Ok(())
}

/// The demo protected application: greets the negotiated principal.
async fn hello(req: Request<Body>) -> Result<Response<Body>, Infallible> {
    let user = req
        .extensions()
        .get::<AuthenticatedIdentity>()
        .map(|id| id.as_str().to_owned())
        .unwrap_or_default();

    let mut response = Response::new(body::full(format!("Hello {user}!\n")));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    Ok(response)
}
