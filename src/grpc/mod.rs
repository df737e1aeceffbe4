//! gRPC surface for rate limit checks and dispatch estimates.

mod server;
mod service;

pub use server::GrpcServer;
pub use service::DispatchServiceImpl;

// Include the generated protobuf code
pub mod proto {
    pub mod nanjil {
        pub mod dispatch {
            pub mod v1 {
                tonic::include_proto!("nanjil.dispatch.v1");
            }
        }
    }
}

// Re-export commonly used types
pub use proto::nanjil::dispatch::v1::{
    dispatch_service_server::DispatchServiceServer, CheckRateLimitRequest,
    CheckRateLimitResponse, EstimateArrivalRequest, EstimateArrivalResponse,
};
