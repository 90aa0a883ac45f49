//! MoMo wallet integration via its REST API (no SDK dependency). Requests
//! are signed with HMAC-SHA256 over the alphabetised raw parameter string.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::models::booking::PaymentMethod;
use crate::services::payment::interface::{
    GatewayError, GatewayOrder, GatewayStatus, OrderRequest, PaymentGateway,
};

const REQUEST_TYPE: &str = "captureWallet";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct MomoConfig {
    pub partner_code: String,
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    pub redirect_url: String,
    pub ipn_url: String,
}

impl MomoConfig {
    pub fn from_env() -> Self {
        Self {
            partner_code: std::env::var("MOMO_PARTNER_CODE")
                .unwrap_or_else(|_| "MOMO".to_string()),
            access_key: std::env::var("MOMO_ACCESS_KEY").unwrap_or_default(),
            secret_key: std::env::var("MOMO_SECRET_KEY").unwrap_or_default(),
            endpoint: std::env::var("MOMO_ENDPOINT")
                .unwrap_or_else(|_| "https://test-payment.momo.vn/v2/gateway/api".to_string()),
            redirect_url: std::env::var("MOMO_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/payment/momo/return".to_string()),
            ipn_url: std::env::var("MOMO_IPN_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/payment/momo/ipn".to_string()),
        }
    }
}

/// Browser-return query parameters, relayed verbatim by the frontend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomoReturnParams {
    pub partner_code: String,
    pub order_id: String,
    pub request_id: String,
    pub amount: String,
    pub order_info: String,
    pub order_type: String,
    pub trans_id: String,
    pub result_code: String,
    pub message: String,
    pub pay_type: String,
    pub response_time: String,
    pub extra_data: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MomoCreateRequest<'a> {
    partner_code: &'a str,
    access_key: &'a str,
    request_id: &'a str,
    amount: i64,
    order_id: &'a str,
    order_info: &'a str,
    redirect_url: &'a str,
    ipn_url: &'a str,
    extra_data: &'a str,
    request_type: &'a str,
    signature: &'a str,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MomoCreateResponse {
    result_code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    pay_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MomoQueryRequest<'a> {
    partner_code: &'a str,
    access_key: &'a str,
    request_id: &'a str,
    order_id: &'a str,
    signature: &'a str,
    lang: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MomoQueryResponse {
    result_code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    trans_id: Option<i64>,
}

pub struct MomoGateway {
    config: MomoConfig,
    http: reqwest::Client,
}

impl MomoGateway {
    pub fn new(config: MomoConfig) -> Result<Self, GatewayError> {
        Url::parse(&config.endpoint)
            .map_err(|err| GatewayError::Config(format!("MOMO_ENDPOINT: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    fn sign(&self, raw: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.secret_key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify the signature MoMo appends to the browser-return parameters.
    /// Fields are alphabetised in the raw string, per the gateway contract.
    pub fn verify_return(&self, params: &MomoReturnParams) -> Result<(), GatewayError> {
        let raw = format!(
            "accessKey={}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}&orderType={}&partnerCode={}&payType={}&requestId={}&responseTime={}&resultCode={}&transId={}",
            self.config.access_key,
            params.amount,
            params.extra_data,
            params.message,
            params.order_id,
            params.order_info,
            params.order_type,
            params.partner_code,
            params.pay_type,
            params.request_id,
            params.response_time,
            params.result_code,
            params.trans_id,
        );
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.secret_key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw.as_bytes());
        let signature =
            hex::decode(&params.signature).map_err(|_| GatewayError::SignatureMismatch)?;
        mac.verify_slice(&signature)
            .map_err(|_| GatewayError::SignatureMismatch)
    }
}

impl PaymentGateway for MomoGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Momo
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let order_id = format!("{}-{}", self.config.partner_code, Uuid::new_v4());
        let request_id = Uuid::new_v4().to_string();
        let extra_data = general_purpose::STANDARD.encode(order.extra_data.as_bytes());

        let raw = format!(
            "accessKey={}&amount={}&extraData={}&ipnUrl={}&orderId={}&orderInfo={}&partnerCode={}&redirectUrl={}&requestId={}&requestType={}",
            self.config.access_key,
            order.amount,
            extra_data,
            self.config.ipn_url,
            order_id,
            order.order_info,
            self.config.partner_code,
            self.config.redirect_url,
            request_id,
            REQUEST_TYPE,
        );
        let signature = self.sign(&raw);

        let body = MomoCreateRequest {
            partner_code: &self.config.partner_code,
            access_key: &self.config.access_key,
            request_id: &request_id,
            amount: order.amount,
            order_id: &order_id,
            order_info: &order.order_info,
            redirect_url: &self.config.redirect_url,
            ipn_url: &self.config.ipn_url,
            extra_data: &extra_data,
            request_type: REQUEST_TYPE,
            signature: &signature,
            lang: "vi",
        };

        let response: MomoCreateResponse = self
            .http
            .post(format!("{}/create", self.config.endpoint))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        if response.result_code != 0 {
            return Err(GatewayError::Rejected {
                code: response.result_code,
                message: response.message.unwrap_or_default(),
            });
        }
        let pay_url = response
            .pay_url
            .ok_or(GatewayError::MalformedResponse("payUrl"))?;

        Ok(GatewayOrder {
            order_id,
            request_id,
            pay_url,
        })
    }

    async fn query_status(
        &self,
        order_id: &str,
        request_id: &str,
    ) -> Result<GatewayStatus, GatewayError> {
        let raw = format!(
            "accessKey={}&orderId={}&partnerCode={}&requestId={}",
            self.config.access_key, order_id, self.config.partner_code, request_id,
        );
        let signature = self.sign(&raw);

        let body = MomoQueryRequest {
            partner_code: &self.config.partner_code,
            access_key: &self.config.access_key,
            request_id,
            order_id,
            signature: &signature,
            lang: "vi",
        };

        let response: MomoQueryResponse = self
            .http
            .post(format!("{}/query", self.config.endpoint))
            .json(&body)
            .send()
            .await?
            .json()
            .await?;

        Ok(GatewayStatus {
            paid: response.result_code == 0,
            transaction_id: response.trans_id.map(|id| id.to_string()),
            message: response
                .message
                .unwrap_or_else(|| format!("resultCode {}", response.result_code)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> MomoGateway {
        MomoGateway::new(MomoConfig {
            partner_code: "MOMOTEST".to_string(),
            access_key: "F8BBA842ECF85".to_string(),
            secret_key: "K951B6PE1waDMi640xX08PD3vg6EkVlz".to_string(),
            endpoint: "https://test-payment.momo.vn/v2/gateway/api".to_string(),
            redirect_url: "http://localhost:3000/return".to_string(),
            ipn_url: "http://localhost:8080/ipn".to_string(),
        })
        .unwrap()
    }

    fn return_params(gateway: &MomoGateway) -> MomoReturnParams {
        let mut params = MomoReturnParams {
            partner_code: "MOMOTEST".to_string(),
            order_id: "MOMOTEST-1234".to_string(),
            request_id: "req-1".to_string(),
            amount: "900000".to_string(),
            order_info: "vivu booking".to_string(),
            order_type: "momo_wallet".to_string(),
            trans_id: "4088878653".to_string(),
            result_code: "0".to_string(),
            message: "Successful.".to_string(),
            pay_type: "qr".to_string(),
            response_time: "1700000000000".to_string(),
            extra_data: "e30=".to_string(),
            signature: String::new(),
        };
        let raw = format!(
            "accessKey={}&amount={}&extraData={}&message={}&orderId={}&orderInfo={}&orderType={}&partnerCode={}&payType={}&requestId={}&responseTime={}&resultCode={}&transId={}",
            "F8BBA842ECF85",
            params.amount,
            params.extra_data,
            params.message,
            params.order_id,
            params.order_info,
            params.order_type,
            params.partner_code,
            params.pay_type,
            params.request_id,
            params.response_time,
            params.result_code,
            params.trans_id,
        );
        params.signature = gateway.sign(&raw);
        params
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let mut config = MomoConfig::from_env();
        config.endpoint = "not a url".to_string();
        assert!(matches!(
            MomoGateway::new(config),
            Err(GatewayError::Config(_))
        ));
    }

    #[test]
    fn test_return_signature_roundtrip() {
        let gw = gateway();
        let params = return_params(&gw);
        assert!(gw.verify_return(&params).is_ok());
    }

    #[test]
    fn test_tampered_return_is_rejected() {
        let gw = gateway();
        let mut params = return_params(&gw);
        params.amount = "1".to_string();
        assert!(matches!(
            gw.verify_return(&params),
            Err(GatewayError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let gw = gateway();
        let mut params = return_params(&gw);
        params.signature = "zz-not-hex".to_string();
        assert!(matches!(
            gw.verify_return(&params),
            Err(GatewayError::SignatureMismatch)
        ));
    }
}
