//! HTTP client for the web-larek backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ApiError, LarekApi};
use crate::config::Endpoints;
use crate::model::{Order, OrderResult, Payment, Product};

/// Talks to `{api}/product` and `{api}/order` over reqwest.
pub struct HttpApi {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpApi {
    pub fn new(endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn read<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl LarekApi for HttpApi {
    async fn product_list(&self) -> Result<Vec<Product>, ApiError> {
        let url = format!("{}/product", self.endpoints.api_url);
        tracing::debug!(%url, "fetching catalog");
        let resp = self.client.get(&url).send().await?;
        let list: ProductList = Self::read(resp).await?;
        let cdn = &self.endpoints.cdn_url;
        Ok(list.items.into_iter().map(|raw| raw.into_product(cdn)).collect())
    }

    async fn product_item(&self, id: &str) -> Result<Product, ApiError> {
        let url = format!("{}/product/{}", self.endpoints.api_url, id);
        tracing::debug!(%url, "fetching product");
        let resp = self.client.get(&url).send().await?;
        let raw: RawProduct = Self::read(resp).await?;
        Ok(raw.into_product(&self.endpoints.cdn_url))
    }

    async fn order_products(&self, order: &Order) -> Result<OrderResult, ApiError> {
        let url = format!("{}/order", self.endpoints.api_url);
        tracing::info!(items = order.items.len(), total = order.total, "submitting order");
        let resp = self
            .client
            .post(&url)
            .json(&OrderRequest::from(order))
            .send()
            .await?;
        Self::read(resp).await
    }
}

/// Join a base URL and a relative path with exactly one slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

// --- Wire types ---

#[derive(Deserialize)]
struct ProductList {
    items: Vec<RawProduct>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: String,
    title: String,
    #[serde(default)]
    price: Option<u64>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
}

impl RawProduct {
    fn into_product(self, cdn_url: &str) -> Product {
        Product {
            id: self.id,
            title: self.title,
            price: self.price,
            category: self.category,
            description: self.description,
            image: join_url(cdn_url, &self.image),
        }
    }
}

#[derive(Serialize)]
struct ItemRef<'a> {
    id: &'a str,
}

/// The order as the backend expects it: items as `[{"id": ...}]`.
#[derive(Serialize)]
struct OrderRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    payment: Option<Payment>,
    address: &'a str,
    email: &'a str,
    phone: &'a str,
    total: u64,
    items: Vec<ItemRef<'a>>,
}

impl<'a> From<&'a Order> for OrderRequest<'a> {
    fn from(order: &'a Order) -> Self {
        Self {
            payment: order.payment,
            address: &order.address,
            email: &order.email,
            phone: &order.phone,
            total: order.total,
            items: order.items.iter().map(|id| ItemRef { id }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_uses_single_slash() {
        assert_eq!(join_url("https://cdn.test/", "/a.svg"), "https://cdn.test/a.svg");
        assert_eq!(join_url("https://cdn.test", "a.svg"), "https://cdn.test/a.svg");
    }

    #[test]
    fn raw_product_gets_absolute_image() {
        let json = r#"{
            "id": "854cef69",
            "description": "Если планируете решать задачи в тренажёре, берите два.",
            "image": "/5_Dots.svg",
            "title": "+1 час в сутках",
            "category": "софт-скил",
            "price": 750
        }"#;
        let raw: RawProduct = serde_json::from_str(json).unwrap();
        let product = raw.into_product("https://larek.test/content/weblarek");
        assert_eq!(product.image, "https://larek.test/content/weblarek/5_Dots.svg");
        assert_eq!(product.price, Some(750));
    }

    #[test]
    fn null_price_is_priceless() {
        let json = r#"{"total": 1, "items": [
            {"id": "b06cde61", "title": "Мамка-таймер", "price": null,
             "category": "софт-скил", "description": "", "image": "Asterisk_2.svg"}
        ]}"#;
        let list: ProductList = serde_json::from_str(json).unwrap();
        assert_eq!(list.items[0].price, None);
    }

    #[test]
    fn order_request_reshapes_items() {
        let order = Order {
            payment: Some(Payment::Card),
            address: "Moscow".to_string(),
            email: "a@b.co".to_string(),
            phone: "+7 999 123 4567".to_string(),
            items: vec!["a".to_string(), "b".to_string()],
            total: 150,
        };
        let json = serde_json::to_value(OrderRequest::from(&order)).unwrap();
        assert_eq!(json["payment"], "card");
        assert_eq!(json["total"], 150);
        assert_eq!(json["items"], serde_json::json!([{"id": "a"}, {"id": "b"}]));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let api = HttpApi::new(Endpoints::new("http://127.0.0.1:1/api", "http://127.0.0.1:1/cdn").unwrap());
        let err = api.product_list().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }
}
