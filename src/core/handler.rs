use crate::adapters::response::{json_response, preflight_response};
use crate::core::prompt;
use crate::domain::model::{AdviceRequest, AdviceResponse, GatewayOutcome};
use crate::domain::ports::CompletionGateway;
use crate::utils::error::AdviceError;
use http::header::{HeaderValue, ALLOW};
use http::{Method, Response, StatusCode};

pub const RATE_LIMIT_MESSAGE: &str = "Rate limit exceeded. Please try again later.";
pub const PAYMENT_REQUIRED_MESSAGE: &str = "AI service requires payment. Please contact support.";
pub const SERVICE_ERROR_MESSAGE: &str = "AI service error";

/// Entry point of the growth-assistant function.
///
/// Each call is independent: one decoded request, at most one gateway call,
/// one JSON response. Nothing is shared between calls except the gateway.
pub struct AdviceHandler<G: CompletionGateway> {
    gateway: G,
    expose_error_detail: bool,
}

impl<G: CompletionGateway> AdviceHandler<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            expose_error_detail: false,
        }
    }

    pub fn with_error_detail(mut self, expose: bool) -> Self {
        self.expose_error_detail = expose;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub async fn handle(&self, method: &Method, body: &[u8]) -> Response<String> {
        if *method == Method::OPTIONS {
            return preflight_response();
        }
        if *method != Method::POST {
            let err = AdviceError::MethodNotAllowed(method.to_string());
            tracing::warn!("Rejected request: {}", err);
            let mut resp = self.error_response(&err);
            resp.headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST, OPTIONS"));
            return resp;
        }

        let request = match AdviceRequest::from_json_slice(body) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!("Rejected advice request: {}", e);
                return self.error_response(&e);
            }
        };

        let (status, response) = self.advise(&request).await;
        json_response(status, &response)
    }

    /// Runs one decoded request through the prompt builder and the gateway.
    pub async fn advise(&self, request: &AdviceRequest) -> (StatusCode, AdviceResponse) {
        let kind = request.kind();
        let prompts = prompt::build_for(request);
        tracing::info!("Requesting {} advice", kind);

        let outcome = match self.gateway.complete(&prompts).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Error in growth-assistant ({}): {}", kind, e);
                return (e.status_code(), AdviceResponse::error(e.client_message()));
            }
        };

        match outcome {
            GatewayOutcome::Success(advice) => {
                tracing::info!("Generated {} advice ({} chars)", kind, advice.len());
                (StatusCode::OK, AdviceResponse::Advice { advice })
            }
            GatewayOutcome::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                AdviceResponse::error(RATE_LIMIT_MESSAGE),
            ),
            GatewayOutcome::PaymentRequired => (
                StatusCode::PAYMENT_REQUIRED,
                AdviceResponse::error(PAYMENT_REQUIRED_MESSAGE),
            ),
            GatewayOutcome::ServiceError(detail) => {
                tracing::error!("AI service error for {} request: {}", kind, detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    AdviceResponse::Error {
                        error: SERVICE_ERROR_MESSAGE.to_string(),
                        detail: self.expose_error_detail.then_some(detail),
                    },
                )
            }
        }
    }

    fn error_response(&self, err: &AdviceError) -> Response<String> {
        json_response(err.status_code(), &AdviceResponse::error(err.client_message()))
    }
}
