pub mod api;

use crate::session::Session;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use log::info;

pub struct Server {
    addr: String,
    session: Arc<Mutex<Session>>,
}

impl Server {
    pub fn new(addr: String, session: Session) -> Self {
        Self {
            addr,
            session: Arc::new(Mutex::new(session)),
        }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = api::router(self.session.clone());
        let listener = tokio::net::TcpListener::bind(addr).await
            .map_err(|e| format!("Failed to bind HTTP server to {}: {}", addr, e))?;
        info!("HTTP API listening on: http://{}", addr);
        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
