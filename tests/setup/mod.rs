use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use salvo::{listener::TcpListener, Router, Server};
use url::Url;

use user_api::{
    config::{DatabaseConfig, WorkerConfig},
    infra::{
        database::{connection::create_pool, schema},
        router,
    },
    message::MessageSource,
};

/// Serves the API over a fresh seeded in-memory database.
pub async fn spawn_app() -> (Client, Url) {
    let pool = create_pool(&DatabaseConfig::in_memory())
        .await
        .expect("Expect to create an in-memory database pool");
    schema::bootstrap(&pool)
        .await
        .expect("Expect to create the users table");

    spawn_router(router::app(
        pool,
        &WorkerConfig::default(),
        Arc::new(MessageSource::embedded()),
    ))
    .await
}

/// Serves `app` on a free local port.
pub async fn spawn_router(app: Router) -> (Client, Url) {
    let port = free_port();
    let address = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&address);
    tokio::spawn(async move { Server::new(listener).serve(app).await });

    let url = Url::parse(&format!("http://{address}")).unwrap();
    wait_until_ready(&url).await;
    (create_client(), url)
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("Expect a free local port")
}

async fn wait_until_ready(url: &Url) {
    let address = format!(
        "{}:{}",
        url.host_str().unwrap(),
        url.port_or_known_default().unwrap()
    );
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(&address).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {address} did not start");
}

pub fn create_client() -> Client {
    let mut headers = HeaderMap::new();
    headers.append("accept", HeaderValue::from_static("application/json"));

    let connect_timeout = 1000 * 5; // 5 sec
    let timeout = 1000 * 10; // 10 sec

    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(connect_timeout))
        .timeout(Duration::from_millis(timeout))
        .default_headers(headers)
        .brotli(true)
        .gzip(true)
        .build()
        .expect("Expect to create a http client")
}
