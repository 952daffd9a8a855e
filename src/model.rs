//! Wire and session types shared by the widget, the dashboard and the
//! headless commands.
//!
//! Nothing here depends on the terminal UI.

use serde::{Deserialize, Deserializer, Serialize};

/// Session-local message identifier, allocated by the widget.
pub type MessageId = u64;

/// Who wrote a message in the chat thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    User,
    Assistant,
}

/// A chat message in the widget thread
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sender: Sender,
    pub products: Vec<Product>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn has_products(&self) -> bool {
        !self.products.is_empty()
    }
}

/// A product as returned by the backend. Kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default, alias = "imageUrl", alias = "image")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "price_as_text")]
    pub price: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default, alias = "variantId", alias = "default_variant_id")]
    pub variant_id: Option<String>,
}

impl Product {
    /// Storefront page for this product, if it has a handle.
    pub fn product_url(&self, shop_domain: &str) -> Option<String> {
        let handle = self.handle.as_deref().filter(|h| !h.is_empty())?;
        let domain = normalize_shop_domain(shop_domain)?;
        Some(format!("https://{}/products/{}", domain, handle))
    }

    /// Cart permalink that adds one unit of the default variant.
    pub fn cart_permalink(&self, shop_domain: &str) -> Option<String> {
        let variant = self.variant_id.as_deref().and_then(numeric_id)?;
        let domain = normalize_shop_domain(shop_domain)?;
        Some(format!("https://{}/cart/{}:1", domain, variant))
    }
}

/// Strip scheme and trailing slashes from a shop URL (`https://my-shop.myshopify.com/`
/// becomes `my-shop.myshopify.com`).
pub fn normalize_shop_domain(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let domain = without_scheme.trim_matches('/');
    if domain.is_empty() {
        None
    } else {
        Some(domain)
    }
}

/// Numeric tail of a Shopify global id (`gid://shopify/ProductVariant/42` -> `42`).
/// Plain numeric ids pass through.
fn numeric_id(id: &str) -> Option<&str> {
    let tail = id.rsplit('/').next()?;
    if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
        Some(tail)
    } else {
        None
    }
}

/// Prices come back as either `"29.99"` or `29.99`.
fn price_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Body of `POST /chat`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_domain: Option<String>,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cart_id: None,
            shop_domain: None,
        }
    }
}

/// Response of `POST /chat`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub response: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<Product>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Product>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Product>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /sync`
#[derive(Clone, PartialEq, Serialize)]
pub struct SyncRequest {
    pub shop_url: String,
    pub api_token: String,
}

// Hand-written so the token never reaches a log line.
impl std::fmt::Debug for SyncRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRequest")
            .field("shop_url", &self.shop_url)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// What we could learn from a successful `/sync` response
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct SyncReport {
    #[serde(default, alias = "indexed", alias = "count")]
    pub products_indexed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_accepts_string_and_numeric_prices() {
        let a: Product =
            serde_json::from_str(r#"{"id":"1","title":"Tee","price":"29.99"}"#).unwrap();
        let b: Product = serde_json::from_str(r#"{"id":"2","title":"Hoodie","price":59.5}"#).unwrap();
        let c: Product = serde_json::from_str(r#"{"id":"3","title":"Cap"}"#).unwrap();

        assert_eq!(a.price.as_deref(), Some("29.99"));
        assert_eq!(b.price.as_deref(), Some("59.5"));
        assert_eq!(c.price, None);
    }

    #[test]
    fn product_field_aliases() {
        let p: Product = serde_json::from_str(
            r#"{"id":"gid://shopify/Product/1","title":"Tee","imageUrl":"https://cdn/x.png","variantId":"gid://shopify/ProductVariant/77","handle":"tee"}"#,
        )
        .unwrap();
        assert_eq!(p.image_url.as_deref(), Some("https://cdn/x.png"));
        assert_eq!(p.variant_id.as_deref(), Some("gid://shopify/ProductVariant/77"));
    }

    #[test]
    fn chat_reply_without_products() {
        let reply: ChatReply = serde_json::from_str(r#"{"response":"hello"}"#).unwrap();
        assert!(reply.products.is_empty());

        let reply: ChatReply =
            serde_json::from_str(r#"{"response":"hello","products":null}"#).unwrap();
        assert!(reply.products.is_empty());
    }

    #[test]
    fn chat_request_omits_unset_fields() {
        let body = serde_json::to_value(ChatRequest::new("hi")).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "hi" }));
    }

    #[test]
    fn product_links() {
        let p = Product {
            id: "gid://shopify/Product/1".into(),
            title: "Tee".into(),
            image_url: None,
            price: None,
            handle: Some("cool-tee".into()),
            variant_id: Some("gid://shopify/ProductVariant/4242".into()),
        };
        assert_eq!(
            p.product_url("https://my-shop.myshopify.com/").as_deref(),
            Some("https://my-shop.myshopify.com/products/cool-tee")
        );
        assert_eq!(
            p.cart_permalink("my-shop.myshopify.com").as_deref(),
            Some("https://my-shop.myshopify.com/cart/4242:1")
        );
        assert_eq!(p.product_url("   "), None);
    }

    #[test]
    fn sync_request_debug_hides_token() {
        let req = SyncRequest {
            shop_url: "my-shop.myshopify.com".into(),
            api_token: "shpat_secret".into(),
        };
        assert!(!format!("{:?}", req).contains("shpat_secret"));
    }

    #[test]
    fn sync_report_count_aliases() {
        let r: SyncReport = serde_json::from_str(r#"{"indexed": 12}"#).unwrap();
        assert_eq!(r.products_indexed, Some(12));
        let r: SyncReport = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(r.products_indexed, None);
    }
}
