use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::domain::models::payment::PaymentIntent;
use crate::domain::ports::PaymentService;
use crate::error::AppError;

#[derive(Deserialize)]
struct StripeIntent {
    id: String,
    client_secret: Option<String>,
    amount: i64,
    currency: String,
    status: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

impl From<StripeIntent> for PaymentIntent {
    fn from(intent: StripeIntent) -> Self {
        Self {
            id: intent.id,
            client_secret: intent.client_secret.unwrap_or_default(),
            amount: intent.amount,
            currency: intent.currency,
            status: intent.status,
            user_id: intent.metadata.get("user_id").cloned(),
        }
    }
}

pub struct StripePaymentService {
    client: Client,
    api_base: String,
    secret_key: Option<String>,
    fee_cents: i64,
    currency: String,
}

impl StripePaymentService {
    pub fn new(api_base: String, secret_key: Option<String>, fee_cents: i64, currency: String) -> Self {
        if secret_key.is_none() {
            info!("STRIPE_SECRET_KEY not set, platform fee payments disabled");
        }
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_base: api_base.trim_end_matches('/').to_string(),
            secret_key,
            fee_cents,
            currency,
        }
    }

    fn key(&self) -> Result<&str, AppError> {
        self.secret_key.as_deref()
            .ok_or_else(|| AppError::ExternalService("Payment processor is not configured".into()))
    }

    async fn decode(&self, res: reqwest::Response) -> Result<PaymentIntent, AppError> {
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Stripe request failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::ExternalService(msg));
        }

        res.json::<StripeIntent>().await
            .map(PaymentIntent::from)
            .map_err(|e| AppError::ExternalService(format!("Malformed Stripe response: {}", e)))
    }
}

#[async_trait]
impl PaymentService for StripePaymentService {
    async fn create_platform_fee_intent(&self, user_id: &str) -> Result<PaymentIntent, AppError> {
        let key = self.key()?;
        let form = [
            ("amount", self.fee_cents.to_string()),
            ("currency", self.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("description", "Event hosting platform fee".to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let res = self.client.post(format!("{}/payment_intents", self.api_base))
            .bearer_auth(key)
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Stripe connection error: {}", e);
                error!("{}", msg);
                AppError::ExternalService(msg)
            })?;

        self.decode(res).await
    }

    async fn retrieve_intent(&self, intent_id: &str) -> Result<PaymentIntent, AppError> {
        let key = self.key()?;
        let res = self.client.get(format!("{}/payment_intents/{}", self.api_base, intent_id))
            .bearer_auth(key)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Stripe connection error: {}", e);
                error!("{}", msg);
                AppError::ExternalService(msg)
            })?;

        self.decode(res).await
    }
}
