use core::str::FromStr;

use serde::{Deserialize, Serialize};

use osdesk_core::error::{optional_text, require_text};
use osdesk_core::{DomainError, DomainResult, Money, ProductId};

/// Catalog entry type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Product,
    Service,
}

impl ProductKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProductKind::Product => "product",
            ProductKind::Service => "service",
        }
    }
}

impl FromStr for ProductKind {
    type Err = DomainError;

    /// Accepts the canonical tags and the Portuguese form labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "product" | "produto" => Ok(ProductKind::Product),
            "service" | "serviço" | "servico" => Ok(ProductKind::Service),
            _ => Err(DomainError::validation(
                "kind must be one of: product, service",
            )),
        }
    }
}

impl core::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry: a product or service with a unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Money,
    pub kind: ProductKind,
}

/// Registration form input. Price and kind arrive as raw text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub kind: String,
}

/// Edit form input. The type tag is not editable once created.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductUpdate {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub price: String,
}

impl Product {
    pub fn create(id: ProductId, input: NewProduct) -> DomainResult<Self> {
        if input.name.trim().is_empty() || input.price.trim().is_empty() || input.kind.trim().is_empty()
        {
            return Err(DomainError::validation("name, price and kind are required"));
        }
        let unit_price = parse_price(&input.price)?;
        let kind: ProductKind = input.kind.parse()?;

        Ok(Self {
            id,
            name: require_text("name", &input.name)?,
            description: optional_text(input.description),
            unit_price,
            kind,
        })
    }

    pub fn update(&mut self, input: ProductUpdate) -> DomainResult<()> {
        if input.name.trim().is_empty() || input.price.trim().is_empty() {
            return Err(DomainError::validation("name and price are required"));
        }
        let unit_price = parse_price(&input.price)?;

        self.name = require_text("name", &input.name)?;
        self.description = optional_text(input.description);
        self.unit_price = unit_price;
        Ok(())
    }
}

fn parse_price(raw: &str) -> DomainResult<Money> {
    raw.parse::<Money>()
        .map_err(|_| DomainError::validation("invalid price"))
}

/// Catalog listing filter: name substring (case-insensitive) and exact kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub name: Option<String>,
    pub kind: Option<ProductKind>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            if !product.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        self.kind.is_none_or(|k| product.kind == k)
    }

    /// Filter and sort ascending by name.
    pub fn apply(&self, products: impl IntoIterator<Item = Product>) -> Vec<Product> {
        let mut out: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();
        out.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product(name: &str, price: &str, kind: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            kind: kind.to_string(),
        }
    }

    #[test]
    fn create_parses_price_and_kind() {
        let p = Product::create(ProductId::new(), new_product("Troca de óleo", "120,50", "Serviço"))
            .unwrap();
        assert_eq!(p.unit_price, Money::from_cents(12_050));
        assert_eq!(p.kind, ProductKind::Service);
    }

    #[test]
    fn create_requires_all_fields() {
        let err = Product::create(ProductId::new(), new_product("Filtro", "", "product")).unwrap_err();
        assert_eq!(err, DomainError::validation("name, price and kind are required"));
    }

    #[test]
    fn create_rejects_invalid_price() {
        let err = Product::create(ProductId::new(), new_product("Filtro", "dez", "product")).unwrap_err();
        assert_eq!(err, DomainError::validation("invalid price"));

        let err = Product::create(ProductId::new(), new_product("Filtro", "-3", "product")).unwrap_err();
        assert_eq!(err, DomainError::validation("invalid price"));
    }

    #[test]
    fn create_rejects_unknown_kind() {
        assert!(Product::create(ProductId::new(), new_product("Filtro", "3", "gadget")).is_err());
    }

    #[test]
    fn update_keeps_kind() {
        let mut p = Product::create(ProductId::new(), new_product("Filtro", "10", "product")).unwrap();
        p.update(ProductUpdate {
            name: "Filtro de ar".into(),
            description: Some("original".into()),
            price: "12.00".into(),
        })
        .unwrap();
        assert_eq!(p.kind, ProductKind::Product);
        assert_eq!(p.unit_price, Money::from_cents(1200));
        assert_eq!(p.description.as_deref(), Some("original"));
    }

    #[test]
    fn filter_by_name_and_kind_sorted() {
        let items = vec![
            Product::create(ProductId::new(), new_product("Pneu", "300", "product")).unwrap(),
            Product::create(ProductId::new(), new_product("Alinhamento", "80", "service")).unwrap(),
            Product::create(ProductId::new(), new_product("Balanceamento", "60", "service")).unwrap(),
        ];

        let services = ProductFilter { name: None, kind: Some(ProductKind::Service) }.apply(items.clone());
        let names: Vec<_> = services.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Alinhamento", "Balanceamento"]);

        let by_name = ProductFilter { name: Some("NEU".into()), kind: None }.apply(items);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Pneu");
    }
}
