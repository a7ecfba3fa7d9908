use serde::{Deserialize, Serialize};

use billbook_core::{DomainError, DomainResult, Entity, Money, ProductId};

/// Product input as entered on the maintenance form (create and edit share it).
///
/// `stock` is signed here because it comes straight from user input; validation
/// turns it into the non-negative stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub description: String,
    pub unit_price: Money,
    pub stock: i64,
}

impl ProductDetails {
    fn validated(self) -> DomainResult<(String, Money, u32)> {
        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("description cannot be empty"));
        }
        if self.unit_price.is_negative() {
            return Err(DomainError::validation("unit_price cannot be negative"));
        }
        let stock = u32::try_from(self.stock).map_err(|_| {
            DomainError::validation(format!(
                "stock must be between 0 and {}, got {}",
                u32::MAX,
                self.stock
            ))
        })?;
        Ok((description, self.unit_price, stock))
    }
}

/// Requested quantity exceeds the stock on hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub requested: u32,
    pub available: u32,
}

impl StockShortfall {
    /// How many units are missing to satisfy the request.
    pub fn missing(&self) -> u32 {
        self.requested.saturating_sub(self.available)
    }
}

/// Entity: Product.
///
/// Stock is an unsigned count, so a product can reach zero but never go below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    description: String,
    unit_price: Money,
    stock: u32,
}

impl Product {
    pub fn create(id: ProductId, details: ProductDetails) -> DomainResult<Self> {
        let (description, unit_price, stock) = details.validated()?;
        Ok(Self {
            id,
            description,
            unit_price,
            stock,
        })
    }

    /// Rebuild a product from stored columns (no validation; the row was validated on write).
    pub fn from_parts(id: ProductId, description: String, unit_price: Money, stock: u32) -> Self {
        Self {
            id,
            description,
            unit_price,
            stock,
        }
    }

    /// Replace description, price and stock level.
    ///
    /// Price changes only affect invoices created afterwards; existing invoice lines
    /// carry the price captured at sale time.
    pub fn update(&mut self, details: ProductDetails) -> DomainResult<()> {
        let (description, unit_price, stock) = details.validated()?;
        self.description = description;
        self.unit_price = unit_price;
        self.stock = stock;
        Ok(())
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    /// Check that `quantity` units can be taken from stock.
    pub fn ensure_available(&self, quantity: u32) -> Result<(), StockShortfall> {
        if quantity > self.stock {
            return Err(StockShortfall {
                requested: quantity,
                available: self.stock,
            });
        }
        Ok(())
    }

    /// Take `quantity` units out of stock, returning what remains.
    ///
    /// Either the whole quantity is taken or nothing changes.
    pub fn take_stock(&mut self, quantity: u32) -> Result<u32, StockShortfall> {
        self.ensure_available(quantity)?;
        self.stock -= quantity;
        Ok(self.stock)
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}
