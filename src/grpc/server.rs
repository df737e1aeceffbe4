//! gRPC server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::{error, info};

use super::proto::nanjil::dispatch::v1::dispatch_service_server::DispatchServiceServer;
use super::service::DispatchServiceImpl;
use crate::error::{NanjilError, Result};
use crate::ratelimit::{RateLimiterBackend, RoutePolicies};

/// gRPC server for the dispatch service.
pub struct GrpcServer<R: RateLimiterBackend + 'static> {
    /// Address to bind to
    addr: SocketAddr,
    /// The rate limiter instance
    rate_limiter: Arc<R>,
    /// Route policies applied to rate limit checks
    policies: Arc<RoutePolicies>,
}

impl<R: RateLimiterBackend + 'static> GrpcServer<R> {
    /// Create a new gRPC server.
    pub fn new(addr: SocketAddr, rate_limiter: Arc<R>, policies: RoutePolicies) -> Self {
        Self {
            addr,
            rate_limiter,
            policies: Arc::new(policies),
        }
    }

    /// Address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    fn service(&self) -> DispatchServiceServer<DispatchServiceImpl<R>> {
        DispatchServiceServer::new(DispatchServiceImpl::new(
            Arc::clone(&self.rate_limiter),
            Arc::clone(&self.policies),
        ))
    }

    /// Start the gRPC server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        info!(addr = %self.addr, "Starting gRPC server for DispatchService");

        Server::builder()
            .add_service(self.service())
            .serve(self.addr)
            .await
            .map_err(|e| {
                error!(error = %e, "gRPC server failed");
                NanjilError::Grpc(e)
            })
    }

    /// Start the gRPC server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        info!(
            addr = %self.addr,
            "Starting gRPC server for DispatchService with graceful shutdown"
        );

        Server::builder()
            .add_service(self.service())
            .serve_with_shutdown(self.addr, signal)
            .await
            .map_err(|e| {
                error!(error = %e, "gRPC server failed");
                NanjilError::Grpc(e)
            })
    }
}
