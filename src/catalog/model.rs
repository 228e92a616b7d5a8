//! Typed response bodies for the catalog endpoints
//!
//! Every listing comes wrapped as `{ "data": ... }`. Ids and prices arrive
//! as either numbers or strings depending on the endpoint, so both forms are
//! accepted.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::BOOKING_LINK;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => n.to_string(),
        NumberOrString::Float(f) => f.to_string(),
        NumberOrString::Text(s) => s,
    })
}

fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Int(n) => Ok(n as f64),
        NumberOrString::Float(f) => Ok(f),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {s}"))),
    }
}

/// Response of `GET products`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductList {
    pub data: Vec<Product>,
}

/// Response of `GET products/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    pub data: Product,
}

/// A bookable tour or ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(deserialize_with = "id_string")]
    pub product_id: String,
    #[serde(deserialize_with = "id_string")]
    pub partner_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub prices: Vec<Price>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    #[serde(deserialize_with = "amount")]
    pub original_price: f64,
    #[serde(deserialize_with = "amount")]
    pub current_price: f64,
}

impl Price {
    pub fn is_discounted(&self) -> bool {
        self.original_price > self.current_price
    }
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.media.first().map(|m| m.image_url.as_str())
    }

    pub fn primary_price(&self) -> Option<&Price> {
        self.prices.first()
    }

    /// Booking page link, crediting `partner` or the product's own partner
    pub fn booking_url(&self, partner: Option<&str>) -> String {
        let partner = partner.unwrap_or(&self.partner_id);
        format!("{}{}&partnerId={}", BOOKING_LINK, self.product_id, partner)
    }
}

/// Response of `GET zones`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneList {
    pub data: Vec<Zone>,
}

/// An area products can be filtered by (`area=<id>`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Response of `GET categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryList {
    pub data: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    pub name: String,
}

/// Response of `GET customers`, used to check the key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerList {
    pub data: Vec<Customer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub guid: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Customer {
    /// Identity to remember for this installation
    pub fn identity(&self) -> &str {
        self.guid.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS: &str = r#"{
        "data": [
            {
                "productId": 812,
                "partnerId": "77",
                "name": "Canal Cruise",
                "type": "tour",
                "category": "Boat",
                "media": [{"imageUrl": "https://cdn.example/canal.jpg"}],
                "prices": [{"originalPrice": "25.00", "currentPrice": 19.5}]
            },
            {
                "productId": "813",
                "partnerId": 77,
                "name": "Museum Pass",
                "type": "ticket"
            }
        ]
    }"#;

    #[test]
    fn test_parse_product_list() {
        let list: ProductList = serde_json::from_str(PRODUCTS).expect("Failed to parse products");
        assert_eq!(list.data.len(), 2);

        let cruise = &list.data[0];
        assert_eq!(cruise.product_id, "812");
        assert_eq!(cruise.partner_id, "77");
        assert_eq!(cruise.kind, "tour");
        assert_eq!(cruise.category.as_deref(), Some("Boat"));
        assert_eq!(cruise.primary_image(), Some("https://cdn.example/canal.jpg"));

        let price = cruise.primary_price().expect("Should have a price");
        assert!((price.original_price - 25.0).abs() < 0.001);
        assert!(price.is_discounted());

        let pass = &list.data[1];
        assert_eq!(pass.product_id, "813");
        assert!(pass.primary_image().is_none());
        assert!(pass.primary_price().is_none());
    }

    #[test]
    fn test_booking_url() {
        let list: ProductList = serde_json::from_str(PRODUCTS).unwrap();
        let cruise = &list.data[0];
        assert_eq!(
            cruise.booking_url(None),
            "https://www.tickets-tours.com/tour/details/?pid=812&partnerId=77"
        );
        assert_eq!(
            cruise.booking_url(Some("5")),
            "https://www.tickets-tours.com/tour/details/?pid=812&partnerId=5"
        );
    }

    #[test]
    fn test_missing_data_key_is_rejected() {
        let result: Result<ProductList, _> = serde_json::from_str(r#"{"items": []}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_amount_is_rejected() {
        let body = r#"{"data":[{"productId":1,"partnerId":1,"name":"x","prices":[{"originalPrice":"free","currentPrice":0}]}]}"#;
        let result: Result<ProductList, _> = serde_json::from_str(body);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_zones_and_categories() {
        let zones: ZoneList =
            serde_json::from_str(r#"{"data":[{"id":3,"name":"Amsterdam"}]}"#).unwrap();
        assert_eq!(zones.data[0].id, "3");
        assert_eq!(zones.data[0].name, "Amsterdam");

        let categories: CategoryList =
            serde_json::from_str(r#"{"data":[{"id":"boat","name":"Boat"}]}"#).unwrap();
        assert_eq!(categories.data[0].id, "boat");
    }

    #[test]
    fn test_customer_identity_prefers_guid() {
        let with_guid: Customer =
            serde_json::from_str(r#"{"id": 9, "guid": "c0ffee"}"#).unwrap();
        assert_eq!(with_guid.identity(), "c0ffee");

        let without: Customer = serde_json::from_str(r#"{"id": 9}"#).unwrap();
        assert_eq!(without.identity(), "9");
    }
}
