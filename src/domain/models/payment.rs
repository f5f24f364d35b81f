use serde::Serialize;

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    /// `metadata.user_id` stamped on the intent when it was created.
    #[serde(skip_serializing)]
    pub user_id: Option<String>,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == "succeeded"
    }

    /// True when this intent paid exactly the platform fee on behalf of `user_id`.
    pub fn covers_fee(&self, user_id: &str, fee_cents: i64, currency: &str) -> bool {
        self.is_succeeded()
            && self.amount == fee_cents
            && self.currency.eq_ignore_ascii_case(currency)
            && self.user_id.as_deref() == Some(user_id)
    }
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UploadTarget {
    #[serde(rename = "uploadURL")]
    pub upload_url: String,
    pub object_path: String,
}
