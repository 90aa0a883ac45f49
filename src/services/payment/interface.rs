use crate::models::booking::PaymentMethod;

/// Booking intent handed to a gateway when creating a hosted-checkout order.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub amount: i64,
    pub order_info: String,
    /// Opaque JSON payload echoed back by the gateway.
    pub extra_data: String,
    pub customer_id: String,
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
    pub request_id: String,
    pub pay_url: String,
}

/// Authoritative payment outcome from the gateway's status API. URL
/// parameters from the browser redirect are only ever a hint.
#[derive(Debug, Clone)]
pub struct GatewayStatus {
    pub paid: bool,
    pub transaction_id: Option<String>,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway rejected the order ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("gateway response is missing {0}")]
    MalformedResponse(&'static str),
    #[error("signature mismatch")]
    SignatureMismatch,
    #[error("invalid gateway configuration: {0}")]
    Config(String),
}

pub trait PaymentGateway {
    fn method(&self) -> PaymentMethod;

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrder, GatewayError>;

    async fn query_status(
        &self,
        order_id: &str,
        request_id: &str,
    ) -> Result<GatewayStatus, GatewayError>;
}
