//! Billing entitlement lookup.
//!
//! Answers one question: does this customer have an active subscription
//! that lifts the free-tier quota? The check fails closed: any network,
//! status or parse problem means "not entitled" so a billing outage can
//! never hand out unlimited requests.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct SubscriptionStatus {
    active: bool,
}

/// Client for the billing status endpoint.
pub struct EntitlementClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl EntitlementClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// True only when billing positively confirms an active
    /// subscription. Customers without an id are never entitled.
    pub async fn is_unrestricted(&self, customer_id: Option<&str>) -> bool {
        let Some(customer_id) = customer_id.filter(|id| !id.is_empty()) else {
            return false;
        };

        let url = format!(
            "{}/v1/subscriptions/{}",
            self.base_url,
            urlencoding::encode(customer_id)
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Entitlement check unreachable, treating as free tier: {}", e);
                return false;
            }
        };

        if !response.status().is_success() {
            log::warn!(
                "Entitlement check returned {}, treating as free tier",
                response.status()
            );
            return false;
        }

        match response.json::<SubscriptionStatus>().await {
            Ok(status) => status.active,
            Err(e) => {
                log::warn!("Unreadable entitlement response, treating as free tier: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn active_subscription_is_unrestricted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/subscriptions/cus_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": true})))
            .mount(&server)
            .await;

        let client = EntitlementClient::new(&server.uri(), "sk_test");
        assert!(client.is_unrestricted(Some("cus_123")).await);
    }

    #[tokio::test]
    async fn inactive_subscription_is_restricted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active": false})))
            .mount(&server)
            .await;

        let client = EntitlementClient::new(&server.uri(), "sk_test");
        assert!(!client.is_unrestricted(Some("cus_123")).await);
    }

    #[tokio::test]
    async fn missing_customer_id_skips_the_lookup() {
        // No mock server at all; the call must short-circuit
        let client = EntitlementClient::new("http://127.0.0.1:1", "sk_test");
        assert!(!client.is_unrestricted(None).await);
        assert!(!client.is_unrestricted(Some("")).await);
    }

    #[tokio::test]
    async fn billing_errors_fail_closed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = EntitlementClient::new(&server.uri(), "sk_test");
        assert!(!client.is_unrestricted(Some("cus_123")).await);
    }

    #[tokio::test]
    async fn malformed_response_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = EntitlementClient::new(&server.uri(), "sk_test");
        assert!(!client.is_unrestricted(Some("cus_123")).await);
    }
}
