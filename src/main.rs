use std::sync::Arc;

use salvo::{listener::TcpListener, Server};

use user_api::{
    config::env_var,
    infra::{
        database::{connection, schema},
        router,
    },
    message::MessageSource,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    let env = env_var::get()?;

    tracing_subscriber::fmt()
        .with_max_level(env.log_level)
        .init();

    let pool = connection::create_pool(&env.database).await?;
    if env.database.seed {
        schema::bootstrap(&pool).await?;
    }

    let messages = Arc::new(MessageSource::embedded());
    let address = format!("0.0.0.0:{}", env.port);
    tracing::info!("Listening on {address}");

    let listener = TcpListener::bind(&address);
    Server::new(listener)
        .serve(router::app(pool, &env.workers, messages))
        .await;
    Ok(())
}
