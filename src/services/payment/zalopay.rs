//! ZaloPay integration via its REST API. Create/query requests are
//! authenticated with `key1` macs, browser-return checksums with `key2`.

use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;
use url::Url;

use crate::models::booking::PaymentMethod;
use crate::services::payment::interface::{
    GatewayError, GatewayOrder, GatewayStatus, OrderRequest, PaymentGateway,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ZaloPayConfig {
    pub app_id: String,
    pub key1: String,
    pub key2: String,
    pub endpoint: String,
    pub callback_url: String,
}

impl ZaloPayConfig {
    pub fn from_env() -> Self {
        Self {
            app_id: std::env::var("ZALOPAY_APP_ID").unwrap_or_else(|_| "2553".to_string()),
            key1: std::env::var("ZALOPAY_KEY1").unwrap_or_default(),
            key2: std::env::var("ZALOPAY_KEY2").unwrap_or_default(),
            endpoint: std::env::var("ZALOPAY_ENDPOINT")
                .unwrap_or_else(|_| "https://sb-openapi.zalopay.vn/v2".to_string()),
            callback_url: std::env::var("ZALOPAY_CALLBACK_URL")
                .unwrap_or_else(|_| "http://localhost:8080/api/payment/zalopay/callback".to_string()),
        }
    }
}

/// Browser-return query parameters, relayed verbatim by the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct ZaloPayReturnParams {
    pub appid: String,
    pub apptransid: String,
    pub pmcid: String,
    pub bankcode: String,
    pub amount: String,
    pub discountamount: String,
    pub status: String,
    pub checksum: String,
}

#[derive(Debug, Deserialize)]
struct ZaloPayCreateResponse {
    return_code: i64,
    #[serde(default)]
    return_message: Option<String>,
    #[serde(default)]
    sub_return_message: Option<String>,
    #[serde(default)]
    order_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ZaloPayQueryResponse {
    return_code: i64,
    #[serde(default)]
    return_message: Option<String>,
    #[serde(default)]
    zp_trans_id: Option<i64>,
}

pub struct ZaloPayGateway {
    config: ZaloPayConfig,
    http: reqwest::Client,
}

impl ZaloPayGateway {
    pub fn new(config: ZaloPayConfig) -> Result<Self, GatewayError> {
        Url::parse(&config.endpoint)
            .map_err(|err| GatewayError::Config(format!("ZALOPAY_ENDPOINT: {err}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { config, http })
    }

    fn mac(key: &str, raw: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(key.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Verify the `checksum` ZaloPay appends to the browser-return
    /// parameters (keyed with `key2`).
    pub fn verify_return(&self, params: &ZaloPayReturnParams) -> Result<(), GatewayError> {
        let raw = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            params.appid,
            params.apptransid,
            params.pmcid,
            params.bankcode,
            params.amount,
            params.discountamount,
            params.status,
        );
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.key2.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(raw.as_bytes());
        let checksum =
            hex::decode(&params.checksum).map_err(|_| GatewayError::SignatureMismatch)?;
        mac.verify_slice(&checksum)
            .map_err(|_| GatewayError::SignatureMismatch)
    }
}

impl PaymentGateway for ZaloPayGateway {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::Zalopay
    }

    async fn create_order(&self, order: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let now = Utc::now();
        // ZaloPay requires the yymmdd_ prefix on transaction ids.
        let suffix: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
        let app_trans_id = format!("{}_{}", now.format("%y%m%d"), suffix);
        let app_time = now.timestamp_millis().to_string();
        let amount = order.amount.to_string();
        let item = "[]";

        let raw = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            self.config.app_id,
            app_trans_id,
            order.customer_id,
            amount,
            app_time,
            order.extra_data,
            item,
        );
        let mac = Self::mac(&self.config.key1, &raw);

        let params = [
            ("app_id", self.config.app_id.as_str()),
            ("app_user", order.customer_id.as_str()),
            ("app_trans_id", app_trans_id.as_str()),
            ("app_time", app_time.as_str()),
            ("amount", amount.as_str()),
            ("item", item),
            ("description", order.order_info.as_str()),
            ("embed_data", order.extra_data.as_str()),
            ("bank_code", ""),
            ("callback_url", self.config.callback_url.as_str()),
            ("mac", mac.as_str()),
        ];

        let response: ZaloPayCreateResponse = self
            .http
            .post(format!("{}/create", self.config.endpoint))
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        if response.return_code != 1 {
            let message = response
                .sub_return_message
                .or(response.return_message)
                .unwrap_or_default();
            return Err(GatewayError::Rejected {
                code: response.return_code,
                message,
            });
        }
        let pay_url = response
            .order_url
            .ok_or(GatewayError::MalformedResponse("order_url"))?;

        Ok(GatewayOrder {
            order_id: app_trans_id.clone(),
            request_id: app_trans_id,
            pay_url,
        })
    }

    async fn query_status(
        &self,
        order_id: &str,
        _request_id: &str,
    ) -> Result<GatewayStatus, GatewayError> {
        let raw = format!("{}|{}|{}", self.config.app_id, order_id, self.config.key1);
        let mac = Self::mac(&self.config.key1, &raw);

        let params = [
            ("app_id", self.config.app_id.as_str()),
            ("app_trans_id", order_id),
            ("mac", mac.as_str()),
        ];

        let response: ZaloPayQueryResponse = self
            .http
            .post(format!("{}/query", self.config.endpoint))
            .form(&params)
            .send()
            .await?
            .json()
            .await?;

        Ok(GatewayStatus {
            paid: response.return_code == 1,
            transaction_id: response.zp_trans_id.map(|id| id.to_string()),
            message: response
                .return_message
                .unwrap_or_else(|| format!("return_code {}", response.return_code)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> ZaloPayGateway {
        ZaloPayGateway::new(ZaloPayConfig {
            app_id: "2553".to_string(),
            key1: "PcY4iZIKFCIdgZvA6ueMcMHHUbRLYjPL".to_string(),
            key2: "kLtgPl8HHhfvMuDHPwKfgfsY4Ydm9eIz".to_string(),
            endpoint: "https://sb-openapi.zalopay.vn/v2".to_string(),
            callback_url: "http://localhost:8080/callback".to_string(),
        })
        .unwrap()
    }

    fn return_params(gw: &ZaloPayGateway) -> ZaloPayReturnParams {
        let mut params = ZaloPayReturnParams {
            appid: "2553".to_string(),
            apptransid: "250807_482913".to_string(),
            pmcid: "38".to_string(),
            bankcode: "".to_string(),
            amount: "900000".to_string(),
            discountamount: "0".to_string(),
            status: "1".to_string(),
            checksum: String::new(),
        };
        let raw = format!(
            "{}|{}|{}|{}|{}|{}|{}",
            params.appid,
            params.apptransid,
            params.pmcid,
            params.bankcode,
            params.amount,
            params.discountamount,
            params.status,
        );
        params.checksum = ZaloPayGateway::mac(&gw.config.key2, &raw);
        params
    }

    #[test]
    fn test_return_checksum_roundtrip() {
        let gw = gateway();
        let params = return_params(&gw);
        assert!(gw.verify_return(&params).is_ok());
    }

    #[test]
    fn test_tampered_status_is_rejected() {
        let gw = gateway();
        let mut params = return_params(&gw);
        params.status = "-49".to_string();
        assert!(matches!(
            gw.verify_return(&params),
            Err(GatewayError::SignatureMismatch)
        ));
    }
}
