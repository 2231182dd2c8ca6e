//! In-process stub of the dashboard backend for client tests.

use axum::Router;

/// Serves `router` on an ephemeral loopback port and returns the API base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub backend");
    let addr = listener.local_addr().expect("stub backend address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub backend");
    });
    format!("http://{}/api/", addr)
}
