//! # HTTP Booking API
//!
//! `reqwest`-backed [`BookingApi`] implementation.
//!
//! ## Status Handling
//! ```text
//! ┌───────────────────────────┬────────────────┬───────────────────────────┐
//! │ Call                      │ Success        │ Otherwise                 │
//! ├───────────────────────────┼────────────────┼───────────────────────────┤
//! │ GET services/{id}         │ 2xx + data     │ 404 / null → NotFound     │
//! │ POST seeb-cart/uploadImgs │ 201            │ UploadFailed              │
//! │ PUT seeb-cart/update/{id} │ 200            │ UpdateRejected            │
//! └───────────────────────────┴────────────────┴───────────────────────────┘
//! ```

use async_trait::async_trait;
use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use seeb_core::{CartItemId, CartUpdatePayload, Service, ServiceId};

use crate::api::{BookingApi, Envelope, ImageUpload, UploadedImages};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Multipart field name the upload endpoint expects.
pub const IMAGE_FIELD: &str = "images[]";

/// Catalog/cart API over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBookingApi {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpBookingApi {
    /// Builds a client from validated configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.api.user_agent.as_str())
            .build()?;

        Ok(HttpBookingApi {
            client,
            base_url: config.base_url()?,
            auth_token: config.api.auth_token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> ClientResult<RequestBuilder> {
        let url = self.base_url.join(path)?;
        let builder = self.client.request(method, url);
        Ok(match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }
}

/// Reads an error body for diagnostics, preferring its `message` field.
async fn error_message(response: Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body
                }
            }),
        Err(_) => status.to_string(),
    }
}

/// Accepts a bare service object or one wrapped in `{status, data}`.
fn parse_service(id: ServiceId, body: Value) -> ClientResult<Service> {
    let is_envelope = body.as_object().is_some_and(|o| o.contains_key("data"));

    if is_envelope {
        let envelope: Envelope<Service> = serde_json::from_value(body)?;
        envelope.data.ok_or(ClientError::ServiceNotFound(id))
    } else if body.is_null() {
        Err(ClientError::ServiceNotFound(id))
    } else {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl BookingApi for HttpBookingApi {
    async fn fetch_service(&self, id: ServiceId) -> ClientResult<Service> {
        debug!(service_id = %id, "Fetching service");
        let response = self
            .request(Method::GET, &format!("services/{}", id))?
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::ServiceNotFound(id));
        }
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
                message: error_message(response).await,
            });
        }

        let body: Value = response.json().await?;
        let service = parse_service(id, body)?;
        debug!(service_id = %id, addons = service.addons.len(), "Service loaded");
        Ok(service)
    }

    async fn upload_images(&self, images: Vec<ImageUpload>) -> ClientResult<Vec<String>> {
        if images.is_empty() {
            return Ok(Vec::new());
        }

        let count = images.len();
        let mut form = multipart::Form::new();
        for image in images {
            let part = multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.content_type)?;
            form = form.part(IMAGE_FIELD, part);
        }

        debug!(count, "Uploading reference images");
        let response = self
            .request(Method::POST, "seeb-cart/uploadImages")?
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = error_message(response).await;
            warn!(status = status.as_u16(), %message, "Image upload rejected");
            return Err(ClientError::UploadFailed(format!("HTTP {}: {}", status.as_u16(), message)));
        }

        let envelope: Envelope<UploadedImages> = response.json().await?;
        let uploaded = envelope
            .data
            .map(|d| d.images)
            .filter(|images| !images.is_empty())
            .ok_or_else(|| ClientError::UploadFailed("response contained no images".into()))?;

        info!(count = uploaded.len(), "Reference images uploaded");
        Ok(uploaded)
    }

    async fn update_cart_item(
        &self,
        id: CartItemId,
        payload: &CartUpdatePayload,
    ) -> ClientResult<()> {
        debug!(cart_item_id = %id, service_id = %payload.service_id, "Updating cart item");
        let response = self
            .request(Method::PUT, &format!("seeb-cart/update/{}", id))?
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let message = error_message(response).await;
            warn!(cart_item_id = %id, status = status.as_u16(), %message, "Cart update rejected");
            return Err(ClientError::UpdateRejected {
                status: status.as_u16(),
                message,
            });
        }

        info!(cart_item_id = %id, amount = %payload.amount, "Cart item updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seeb_core::{CartId, RateType, UserId};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer, token: Option<&str>) -> HttpBookingApi {
        let mut config = ClientConfig::default();
        config.api.base_url = format!("{}/api", server.uri());
        config.api.auth_token = token.map(str::to_string);
        HttpBookingApi::new(&config).unwrap()
    }

    fn service_json() -> Value {
        json!({
            "id": 12, "name": "False Ceiling", "rate_type": "square_feet", "rate": "85.50",
            "addons": [{"id": 1, "name": "Cove light", "price_type": "unit",
                        "price": "450", "qty": "1", "is_required": "0"}]
        })
    }

    fn payload() -> CartUpdatePayload {
        CartUpdatePayload {
            cart_id: CartId::new(3),
            user_id: UserId::new(9),
            service_id: ServiceId::new(12),
            service_type_id: None,
            room_id: None,
            rate_type: RateType::SquareFeet,
            value: "12X8".into(),
            rate: seeb_core::Money::from_minor(5000),
            amount: seeb_core::Money::from_minor(480000),
            reference_image: "[]".into(),
            addons: "[]".into(),
        }
    }

    #[tokio::test]
    async fn test_fetch_service_bare_and_enveloped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/services/12"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(service_json()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/services/13"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": true,
                "data": {"id": "13", "name": "Wiring", "rate_type": "points", "rate": 350}
            })))
            .mount(&server)
            .await;

        let api = api_for(&server, Some("secret"));
        let service = api.fetch_service(ServiceId::new(12)).await.unwrap();
        assert_eq!(service.rate().to_string(), "85.50");
        assert_eq!(service.addons.len(), 1);

        let service = api.fetch_service(ServiceId::new(13)).await.unwrap();
        assert_eq!(service.rate_type, RateType::Points);
        assert!(service.addons.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_service_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/services/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/services/5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": false, "data": null})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/services/6"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;

        let api = api_for(&server, None);
        assert!(matches!(
            api.fetch_service(ServiceId::new(404)).await,
            Err(ClientError::ServiceNotFound(_))
        ));
        assert!(matches!(
            api.fetch_service(ServiceId::new(5)).await,
            Err(ClientError::ServiceNotFound(_))
        ));
        match api.fetch_service(ServiceId::new(6)).await {
            Err(ClientError::Http { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "db down");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_images_requires_created() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/seeb-cart/uploadImages"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "status": 201,
                "data": {"images": ["https://cdn.seeb.in/1.jpg", "https://cdn.seeb.in/2.jpg"]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server, None);
        let uploaded = api
            .upload_images(vec![
                ImageUpload::new("one.jpg", vec![1, 2, 3]),
                ImageUpload::new("two.png", vec![4, 5]),
            ])
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 2);

        let requests = server.received_requests().await.unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"images[]\""));
        assert!(body.contains("filename=\"two.png\""));

        assert!(api.upload_images(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_images_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/seeb-cart/uploadImages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
            .mount(&server)
            .await;

        let api = api_for(&server, None);
        let err = api
            .upload_images(vec![ImageUpload::new("one.jpg", vec![1])])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::UploadFailed(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_update_cart_item() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/seeb-cart/update/44"))
            .and(body_partial_json(json!({
                "cart_id": 3, "service_id": 12, "value": "12X8",
                "rate": "50.00", "amount": "4800.00", "addons": "[]"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": 200})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/seeb-cart/update/45"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({"message": "invalid room"})))
            .mount(&server)
            .await;

        let api = api_for(&server, None);
        api.update_cart_item(CartItemId::new(44), &payload()).await.unwrap();

        match api.update_cart_item(CartItemId::new(45), &payload()).await {
            Err(ClientError::UpdateRejected { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "invalid room");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_service_rejects_garbage() {
        let err = parse_service(ServiceId::new(1), json!({"unexpected": true})).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
        assert!(matches!(
            parse_service(ServiceId::new(1), Value::Null),
            Err(ClientError::ServiceNotFound(_))
        ));
    }
}
