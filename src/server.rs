//! Gateway assembly and the accept loop.
//!
//! `Gateway` is the statically composed chain the process serves:
//! Router → NegotiateMiddleware → protected application, with the
//! credential proxy and bootstrap branches dispatched before (and without)
//! authentication.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::future::BoxFuture;
use http::{Request, Response, StatusCode, Uri};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower_service::Service;

use crate::auth::{Acceptor, NegotiateMiddleware};
use crate::body::{self, Body, BoxError};
use crate::bootstrap;
use crate::proxy::KdcProxy;
use crate::routing::{RouteDecision, Router};

/// The composed gateway service: route, authenticate, dispatch.
pub struct Gateway<S, A> {
    router: Arc<Router>,
    proxy: Option<Arc<KdcProxy>>,
    protected: NegotiateMiddleware<S, A>,
}

impl<S: Clone, A> Clone for Gateway<S, A> {
    fn clone(&self) -> Self {
        Gateway {
            router: self.router.clone(),
            proxy: self.proxy.clone(),
            protected: self.protected.clone(),
        }
    }
}

impl<S, A> Gateway<S, A> {
    /// Start building a gateway around an acceptor and the protected
    /// application service.
    pub fn builder(acceptor: A, app: S) -> GatewayBuilder<S, A> {
        GatewayBuilder {
            acceptor,
            app,
            router: Router::new(),
            upstream: None,
        }
    }
}

/// Builder for [`Gateway`].
pub struct GatewayBuilder<S, A> {
    acceptor: A,
    app: S,
    router: Router,
    upstream: Option<Uri>,
}

impl<S, A> GatewayBuilder<S, A> {
    /// Mount the credential proxy at an exact path (e.g. `/KdcProxy`),
    /// forwarding to `upstream`. The mount bypasses authentication.
    pub fn kdc_proxy<M: Into<String>>(mut self, mount: M, upstream: Uri) -> Self {
        self.router = self.router.proxy_mount(mount);
        self.upstream = Some(upstream);
        self
    }

    /// Serve static bootstrap content under `prefix` (e.g. `/login/`) from
    /// the directory `root`. The mount bypasses authentication.
    pub fn login_dir<P: Into<String>>(mut self, prefix: P, root: PathBuf) -> Self {
        self.router = self.router.bootstrap_mount(prefix, root);
        self
    }

    pub fn build(self) -> Gateway<S, A> {
        Gateway {
            router: Arc::new(self.router),
            proxy: self.upstream.map(|upstream| Arc::new(KdcProxy::new(upstream))),
            protected: NegotiateMiddleware::new(self.app, self.acceptor),
        }
    }
}

impl<S, A, B> Service<Request<B>> for Gateway<S, A>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    A: Acceptor,
    B: http_body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response<Body>, Infallible>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.protected.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        let req = req.map(body::boxed);

        match self.router.route(req.uri().path()) {
            RouteDecision::CredentialProxy => match self.proxy.clone() {
                Some(proxy) => Box::pin(async move { Ok(proxy.forward(req).await) }),
                // The builder pairs the mount with an upstream, so this arm
                // only fires on a hand-assembled router.
                None => {
                    log::error!("credential proxy mount has no upstream configured");
                    Box::pin(async { Ok(internal_error()) })
                }
            },
            RouteDecision::StaticBootstrap(path) => {
                Box::pin(async move { Ok(bootstrap::serve(path).await) })
            }
            RouteDecision::ProtectedApp => self.protected.call(req),
        }
    }
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

/// Bind `addr` and serve the gateway until the process is stopped.
///
/// Each connection runs on its own task; requests hold no state shared
/// beyond the read-only credentials inside the acceptor.
pub async fn serve<S, A>(addr: SocketAddr, gateway: Gateway<S, A>) -> crate::Result<()>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = Infallible>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
    A: Acceptor,
{
    let listener = TcpListener::bind(addr).await.map_err(crate::error::io)?;
    let local = listener.local_addr().map_err(crate::error::io)?;
    log::info!("listening on http://{local}");

    loop {
        let (stream, remote) = listener.accept().await.map_err(crate::error::io)?;
        let service = TowerToHyperService::new(gateway.clone());

        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            if let Err(e) = auto::Builder::new(TokioExecutor::new())
                .serve_connection(io, service)
                .await
            {
                log::debug!("connection from {remote} ended with error: {e}");
            }
        });
    }
}
