use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use tessera_runtime::{HttpConfig, Module, ModuleContext, RuntimeError, RuntimeResult};

use crate::error::{ServerError, ServerResult};
use crate::router::{build_router, cors_layer, AdminState};

const MODULE_NAME: &str = "http";

/// Admin HTTP listener, run as an application module.
pub struct AdminServer {
    config: HttpConfig,
    addr: Option<SocketAddr>,
    state: Option<AdminState>,
    cors: Option<CorsLayer>,
    running: Option<Running>,
}

struct Running {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl AdminServer {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            addr: None,
            state: None,
            cors: None,
            running: None,
        }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Address actually bound, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }

    async fn bind(&mut self) -> ServerResult<()> {
        let (addr, state) = match (self.addr, self.state.clone()) {
            (Some(addr), Some(state)) => (addr, state),
            _ => return Err(ServerError::Config("server not configured".into())),
        };
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener.local_addr()?;

        let app = build_router(state, self.cors.clone());
        let (shutdown, signal) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!(%local_addr, "admin server listening");
        self.running = Some(Running {
            local_addr,
            shutdown,
            task,
        });
        Ok(())
    }

    async fn shutdown(&mut self) -> ServerResult<()> {
        let running = self.running.take().ok_or(ServerError::NotRunning)?;
        let _ = running.shutdown.send(());
        running
            .task
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))??;
        tracing::info!(local_addr = %running.local_addr, "admin server stopped");
        Ok(())
    }
}

#[async_trait]
impl Module for AdminServer {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn configure(&mut self, ctx: &ModuleContext) -> RuntimeResult<()> {
        self.addr = Some(self.config.socket_addr()?);
        self.cors = cors_layer(&self.config.cors_allow_origin)
            .map_err(|e| RuntimeError::module(MODULE_NAME, e))?;
        self.state = Some(AdminState {
            storage: ctx.storage()?,
            log_level: ctx.log_level().clone(),
        });
        Ok(())
    }

    async fn start(&mut self) -> RuntimeResult<()> {
        if self.running.is_some() {
            return Err(RuntimeError::module(MODULE_NAME, "already started"));
        }
        self.bind()
            .await
            .map_err(|e| RuntimeError::module(MODULE_NAME, e))
    }

    async fn stop(&mut self) -> RuntimeResult<()> {
        if self.running.is_none() {
            return Ok(());
        }
        self.shutdown()
            .await
            .map_err(|e| RuntimeError::module(MODULE_NAME, e))
    }
}
