use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a product. Has no owner field at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductSummary {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            image_url: product.image_url,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Validated create payload
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

impl NewProduct {
    /// Build the row to persist, owned by `owner_id`
    pub fn into_product(self, owner_id: Uuid) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    /// Apply in place. Owner and id are never touched.
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = Some(image_url);
        }
        product.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lamp(owner: Uuid) -> Product {
        NewProduct {
            name: "Desk lamp".into(),
            description: "Dimmable".into(),
            price: Decimal::new(3450, 2),
            image_url: None,
        }
        .into_product(owner)
    }

    #[test]
    fn serializes_camel_case_with_numeric_price() {
        let owner = Uuid::new_v4();
        let value = serde_json::to_value(lamp(owner)).unwrap();
        assert_eq!(value["price"], json!(34.5));
        assert_eq!(value["ownerId"], json!(owner.to_string()));
        assert!(value.get("imageUrl").is_some());
    }

    #[test]
    fn summary_has_no_owner() {
        let summary = ProductSummary::from(lamp(Uuid::new_v4()));
        let value = serde_json::to_value(summary).unwrap();
        assert!(value.get("ownerId").is_none());
        assert_eq!(value["name"], json!("Desk lamp"));
    }

    #[test]
    fn patch_keeps_owner_and_untouched_fields() {
        let owner = Uuid::new_v4();
        let mut product = lamp(owner);
        let id = product.id;

        ProductPatch {
            price: Some(Decimal::new(2999, 2)),
            ..Default::default()
        }
        .apply(&mut product);

        assert_eq!(product.id, id);
        assert_eq!(product.owner_id, owner);
        assert_eq!(product.name, "Desk lamp");
        assert_eq!(product.price, Decimal::new(2999, 2));
    }
}
