//! Dispatch service implementation.

use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{debug, info, instrument, warn};

use super::proto::nanjil::dispatch::v1::{
    check_rate_limit_response::Code, dispatch_service_server::DispatchService,
    CheckRateLimitRequest, CheckRateLimitResponse, EstimateArrivalRequest,
    EstimateArrivalResponse, Rejection,
};
use super::proto::nanjil::dispatch::v1::Coordinates as ProtoCoordinates;

use crate::dispatch::{self, Coordinates};
use crate::ratelimit::{client_id_from_headers, Decision, RateLimiterBackend, RoutePolicies};

/// Implementation of the DispatchService gRPC interface.
pub struct DispatchServiceImpl<R: RateLimiterBackend> {
    /// The rate limiter instance
    rate_limiter: Arc<R>,
    /// Policy lookup by request path
    policies: Arc<RoutePolicies>,
}

impl<R: RateLimiterBackend> DispatchServiceImpl<R> {
    /// Create a new DispatchServiceImpl with the given rate limiter.
    pub fn new(rate_limiter: Arc<R>, policies: Arc<RoutePolicies>) -> Self {
        Self {
            rate_limiter,
            policies,
        }
    }
}

fn coordinates(field: &str, value: Option<ProtoCoordinates>) -> Result<Coordinates, Status> {
    let value = value.ok_or_else(|| {
        warn!(field = field, "Missing coordinates");
        Status::invalid_argument(format!("{} is required", field))
    })?;

    Coordinates::new(value.latitude, value.longitude).map_err(|e| {
        warn!(field = field, error = %e, "Invalid coordinates");
        Status::invalid_argument(format!("{}: {}", field, e))
    })
}

#[tonic::async_trait]
impl<R: RateLimiterBackend + 'static> DispatchService for DispatchServiceImpl<R> {
    /// Count a request and decide whether it may proceed.
    #[instrument(
        skip(self, request),
        fields(path = %request.get_ref().path)
    )]
    async fn check_rate_limit(
        &self,
        request: Request<CheckRateLimitRequest>,
    ) -> Result<Response<CheckRateLimitResponse>, Status> {
        let req = request.into_inner();

        if req.path.is_empty() {
            warn!("Received rate limit request with empty path");
            return Err(Status::invalid_argument("path is required"));
        }

        let client_id = client_id_from_headers(&req.headers);
        let policy = self.policies.policy_for(&req.path);

        debug!(
            client_id = %client_id,
            max_requests = policy.max_requests,
            window_ms = policy.window_ms,
            "Processing rate limit request"
        );

        let decision = self
            .rate_limiter
            .check_rate_limit(policy, &client_id, &req.path)
            .await;

        let response = match decision {
            Decision::Allow { count, reset_at_ms } => CheckRateLimitResponse {
                code: Code::Ok.into(),
                count,
                reset_at_ms,
                rejection: None,
            },
            Decision::Reject(rejection) => {
                info!(
                    client_id = %client_id,
                    path = %req.path,
                    "Request rejected by rate limit"
                );
                CheckRateLimitResponse {
                    code: Code::OverLimit.into(),
                    count: policy.max_requests,
                    reset_at_ms: rejection.reset_at_ms,
                    rejection: Some(Rejection {
                        code: rejection.code.to_string(),
                        message: rejection.message,
                        http_status: u32::from(rejection.status),
                        retry_after_ms: rejection.retry_after_ms,
                    }),
                }
            }
        };

        Ok(Response::new(response))
    }

    /// Distance and travel time between two points.
    #[instrument(skip(self, request))]
    async fn estimate_arrival(
        &self,
        request: Request<EstimateArrivalRequest>,
    ) -> Result<Response<EstimateArrivalResponse>, Status> {
        let req = request.into_inner();

        let origin = coordinates("origin", req.origin)?;
        let destination = coordinates("destination", req.destination)?;

        let estimate = dispatch::estimate(&origin, &destination)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;

        debug!(
            distance_km = estimate.distance_km,
            minutes = estimate.arrival.minutes,
            "Arrival estimated"
        );

        Ok(Response::new(EstimateArrivalResponse {
            distance_km: estimate.distance_km,
            minutes: estimate.arrival.minutes,
            text: estimate.arrival.text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ratelimit::{ManualClock, RateLimitPolicy, RateLimiter};
    use std::collections::HashMap;

    fn service(policies: RoutePolicies) -> DispatchServiceImpl<RateLimiter<ManualClock>> {
        DispatchServiceImpl::new(
            Arc::new(RateLimiter::new(ManualClock::new(0))),
            Arc::new(policies),
        )
    }

    fn check_request(client: Option<&str>, path: &str) -> Request<CheckRateLimitRequest> {
        let mut headers = HashMap::new();
        if let Some(client) = client {
            headers.insert("x-forwarded-for".to_string(), client.to_string());
        }
        Request::new(CheckRateLimitRequest {
            headers,
            path: path.to_string(),
        })
    }

    #[tokio::test]
    async fn test_empty_path_rejected() {
        let service = service(RoutePolicies::default());

        let result = service.check_rate_limit(check_request(None, "")).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_valid_request_returns_ok() {
        let service = service(RoutePolicies::default());

        let response = service
            .check_rate_limit(check_request(Some("198.51.100.1"), "/api/services"))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(response.code(), Code::Ok);
        assert_eq!(response.count, 1);
        assert_eq!(response.reset_at_ms, 60_000);
        assert!(response.rejection.is_none());
    }

    #[tokio::test]
    async fn test_route_policy_applies_and_rejects() {
        let policies = RoutePolicies::default().with_route(
            "/api/bookings",
            RateLimitPolicy::new(900_000, 2)
                .unwrap()
                .with_message("Too many booking attempts"),
        );
        let service = service(policies);

        for _ in 0..2 {
            let response = service
                .check_rate_limit(check_request(Some("a"), "/api/bookings"))
                .await
                .unwrap()
                .into_inner();
            assert_eq!(response.code(), Code::Ok);
        }

        let response = service
            .check_rate_limit(check_request(Some("a"), "/api/bookings"))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.code(), Code::OverLimit);
        assert_eq!(response.count, 2);
        assert_eq!(response.reset_at_ms, 900_000);

        let rejection = response.rejection.unwrap();
        assert_eq!(rejection.code, "RATE_LIMIT_EXCEEDED");
        assert_eq!(rejection.message, "Too many booking attempts");
        assert_eq!(rejection.http_status, 429);
        assert_eq!(rejection.retry_after_ms, 900_000);

        // Another client still has its own window.
        let response = service
            .check_rate_limit(check_request(Some("b"), "/api/bookings"))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(response.code(), Code::Ok);
    }

    #[tokio::test]
    async fn test_clients_without_headers_share_a_bucket() {
        let policies =
            RoutePolicies::new(RateLimitPolicy::new(1000, 1).unwrap());
        let service = service(policies);

        let first = service
            .check_rate_limit(check_request(None, "/x"))
            .await
            .unwrap()
            .into_inner();
        let second = service
            .check_rate_limit(check_request(None, "/x"))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(first.code(), Code::Ok);
        assert_eq!(second.code(), Code::OverLimit);
    }

    #[tokio::test]
    async fn test_estimate_arrival() {
        let service = service(RoutePolicies::default());

        let response = service
            .estimate_arrival(Request::new(EstimateArrivalRequest {
                origin: Some(ProtoCoordinates {
                    latitude: 0.0,
                    longitude: 0.0,
                }),
                destination: Some(ProtoCoordinates {
                    latitude: 0.0,
                    longitude: 90.0,
                }),
            }))
            .await
            .unwrap()
            .into_inner();

        assert!((response.distance_km - 10007.543).abs() < 0.01);
        // 10007.543 km at 25 km/h
        assert_eq!(response.minutes, 24019);
        assert_eq!(response.text, "400 hours 19 minutes");
    }

    #[tokio::test]
    async fn test_estimate_missing_destination() {
        let service = service(RoutePolicies::default());

        let result = service
            .estimate_arrival(Request::new(EstimateArrivalRequest {
                origin: Some(ProtoCoordinates {
                    latitude: 8.18,
                    longitude: 77.41,
                }),
                destination: None,
            }))
            .await;

        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_estimate_invalid_coordinates() {
        let service = service(RoutePolicies::default());

        let result = service
            .estimate_arrival(Request::new(EstimateArrivalRequest {
                origin: Some(ProtoCoordinates {
                    latitude: f64::NAN,
                    longitude: 77.41,
                }),
                destination: Some(ProtoCoordinates {
                    latitude: 8.18,
                    longitude: 77.41,
                }),
            }))
            .await;

        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }
}
