//! Endpoint HTTP `GET /health` que consulta el despliegue blue/green.
//!
//! Siempre responde 200; el orquestador decide con los campos `ready` y
//! `active` a qué instancia mandar el tráfico.

use anyhow::Result;
use axum::{extract::State, routing::get, Json, Router};
use std::net::SocketAddr;
use tracing::info;

use crate::active::{ActiveSwitch, HealthReport};

/// GET /health
async fn health(State(switch): State<ActiveSwitch>) -> Json<HealthReport> {
    Json(switch.health())
}

pub fn router(switch: ActiveSwitch) -> Router {
    Router::new().route("/health", get(health)).with_state(switch)
}

/// Sirve `/health` en `0.0.0.0:port` hasta que el proceso termine
pub async fn serve(switch: ActiveSwitch, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("🩺 Health check escuchando en {}", addr);
    axum::serve(listener, router(switch)).await?;

    Ok(())
}
