//! Localhost HTTP endpoints for exercising the real clients in tests.

use axum::Router;
use std::net::TcpListener;
use std::thread;

/// Serve `router` on an ephemeral port and return its base URL.
///
/// The server runs on its own runtime thread so blocking clients can be
/// driven from the test thread.
pub(crate) fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, router).await.unwrap();
        });
    });

    format!("http://{addr}")
}
