use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::domain::models::payment::UploadTarget;
use crate::domain::ports::ObjectStorage;
use crate::error::AppError;

const UPLOAD_URL_TTL_SECS: i64 = 900;

#[derive(Serialize)]
struct SignRequest<'a> {
    bucket_name: &'a str,
    object_name: &'a str,
    method: &'a str,
    expires_at: String,
}

#[derive(Deserialize)]
struct SignResponse {
    signed_url: String,
}

/// Asks a signing sidecar for a short-lived PUT URL into the uploads bucket.
pub struct SignedUrlStorage {
    client: Client,
    signing_url: String,
    bucket: String,
}

impl SignedUrlStorage {
    pub fn new(signing_url: String, bucket: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            signing_url,
            bucket,
        }
    }
}

#[async_trait]
impl ObjectStorage for SignedUrlStorage {
    async fn signed_upload_url(&self) -> Result<UploadTarget, AppError> {
        let object_name = format!("uploads/{}", Uuid::new_v4());
        let request = SignRequest {
            bucket_name: &self.bucket,
            object_name: &object_name,
            method: "PUT",
            expires_at: (Utc::now() + chrono::Duration::seconds(UPLOAD_URL_TTL_SECS)).to_rfc3339(),
        };

        let res = self.client.post(&self.signing_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Object storage signing error: {}", e);
                error!("{}", msg);
                AppError::ExternalService(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let msg = format!("Object storage signing failed. Status: {}", status);
            error!("{}", msg);
            return Err(AppError::ExternalService(msg));
        }

        let body: SignResponse = res.json().await
            .map_err(|e| AppError::ExternalService(format!("Malformed signing response: {}", e)))?;

        Ok(UploadTarget {
            upload_url: body.signed_url,
            object_path: format!("/objects/{}", object_name),
        })
    }
}
