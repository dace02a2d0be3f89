//! A minimal local HTTP server for integration tests.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpListener;

pub struct Server {
    addr: SocketAddr,
}

impl Server {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

/// Spawn a test server on its own thread and runtime, answering every
/// request with `func`.
pub fn http<F, Fut>(func: F) -> Server
where
    F: Fn(Request<Incoming>) -> Fut + Clone + Send + 'static,
    Fut: Future<Output = Response<Full<Bytes>>> + Send + 'static,
{
    let (addr_tx, addr_rx) = mpsc::channel();

    thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test server runtime");

        rt.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("test server bind");
            addr_tx
                .send(listener.local_addr().expect("test server addr"))
                .expect("test server addr channel");

            loop {
                let (stream, _) = listener.accept().await.expect("test server accept");
                let func = func.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let func = func.clone();
                        async move { Ok::<_, Infallible>(func(req).await) }
                    });
                    let _ = auto::Builder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });
    });

    Server {
        addr: addr_rx.recv().expect("test server startup"),
    }
}
