use serde::{Deserialize, Serialize};

use flogin_core::{CategoryId, DomainError, ProductId, UserId};

/// A product as returned by the catalog API.
///
/// Field names on the wire follow the server's DTO (`ten`, `gia`, `soLuong`).
/// Prices are whole currency units (the catalog is priced in VND, which has
/// no minor unit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "ten")]
    pub name: String,
    #[serde(rename = "gia")]
    pub price: u64,
    #[serde(rename = "soLuong")]
    pub quantity: u64,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    #[serde(rename = "createdById", default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<UserId>,
}

/// Raw, unvalidated form input for a product.
///
/// `None` means the user has not entered a value yet. Numbers are signed so a
/// negative entry can be reported instead of silently rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: Option<i64>,
    pub quantity: Option<i64>,
    pub category_id: Option<CategoryId>,
    pub created_by_id: Option<UserId>,
}

/// Validated payload for create/update calls.
///
/// Update replaces every editable field, so the same shape is used for both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    #[serde(rename = "ten")]
    pub name: String,
    #[serde(rename = "gia")]
    pub price: u64,
    #[serde(rename = "soLuong")]
    pub quantity: u64,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    #[serde(rename = "createdById", default, skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<UserId>,
}

/// Form field a violation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Price,
    Quantity,
    Category,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Price => "price",
            Field::Quantity => "quantity",
            Field::Category => "category",
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: Field,
    pub message: String,
}

impl FieldViolation {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Every rule a draft failed, in form order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn as_slice(&self) -> &[FieldViolation] {
        &self.0
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().map(|v| v.field)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields().any(|f| f == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl core::fmt::Display for Violations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for Violations {}

impl From<Violations> for DomainError {
    fn from(value: Violations) -> Self {
        DomainError::validation(value.to_string())
    }
}

impl ProductDraft {
    /// Check every required field locally.
    ///
    /// Collects all violations rather than stopping at the first, so a form can
    /// flag every offending input at once.
    pub fn validate(&self) -> Result<ProductInput, Violations> {
        let mut violations = Vec::new();

        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new(Field::Name, "name must not be blank"));
        }

        let price = match self.price {
            None => {
                violations.push(FieldViolation::new(Field::Price, "price is required"));
                None
            }
            Some(p) if p < 0 => {
                violations.push(FieldViolation::new(Field::Price, "price must not be negative"));
                None
            }
            Some(p) => Some(p as u64),
        };

        let quantity = match self.quantity {
            None => {
                violations.push(FieldViolation::new(Field::Quantity, "quantity is required"));
                None
            }
            Some(q) if q < 0 => {
                violations.push(FieldViolation::new(
                    Field::Quantity,
                    "quantity must not be negative",
                ));
                None
            }
            Some(q) => Some(q as u64),
        };

        if self.category_id.is_none() {
            violations.push(FieldViolation::new(Field::Category, "category must be selected"));
        }

        match (price, quantity, self.category_id) {
            (Some(price), Some(quantity), Some(category_id)) if violations.is_empty() => {
                Ok(ProductInput {
                    name: self.name.clone(),
                    price,
                    quantity,
                    category_id,
                    created_by_id: self.created_by_id,
                })
            }
            _ => Err(Violations(violations)),
        }
    }
}

impl From<&Product> for ProductDraft {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            price: i64::try_from(product.price).ok(),
            quantity: i64::try_from(product.quantity).ok(),
            category_id: Some(product.category_id),
            created_by_id: product.created_by_id,
        }
    }
}
