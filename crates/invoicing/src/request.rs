use std::collections::BTreeMap;

use billbook_core::ProductId;

/// Parse one quantity field of the invoice form.
///
/// Blank, non-numeric, non-integral, zero and negative values all mean "not purchased"
/// and yield `None`.
pub fn parse_quantity(raw: &str) -> Option<u32> {
    let quantity: i64 = raw.trim().parse().ok()?;
    if quantity <= 0 {
        return None;
    }
    u32::try_from(quantity).ok()
}

/// Requested quantities per product, keyed in ascending product id order.
///
/// Only positive quantities are ever stored. The ordering is the order in which the
/// transaction manager locks product rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedLines(BTreeMap<ProductId, u32>);

impl RequestedLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw form fields (`product id → quantity text`), skipping every field
    /// that [`parse_quantity`] rejects.
    pub fn from_form<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (ProductId, S)>,
        S: AsRef<str>,
    {
        let mut lines = Self::new();
        for (product_id, raw) in fields {
            if let Some(quantity) = parse_quantity(raw.as_ref()) {
                lines.set(product_id, quantity);
            }
        }
        lines
    }

    /// Set the quantity for a product. Zero removes the product.
    pub fn set(&mut self, product_id: ProductId, quantity: u32) {
        if quantity == 0 {
            self.0.remove(&product_id);
        } else {
            self.0.insert(product_id, quantity);
        }
    }

    /// Purchased products with their quantities, ascending by product id.
    pub fn purchased(&self) -> impl Iterator<Item = (ProductId, u32)> + '_ {
        self.0.iter().map(|(id, q)| (*id, *q))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(ProductId, u32)> for RequestedLines {
    fn from_iter<T: IntoIterator<Item = (ProductId, u32)>>(iter: T) -> Self {
        let mut lines = Self::new();
        for (product_id, quantity) in iter {
            lines.set(product_id, quantity);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quantity_follows_form_convention() {
        assert_eq!(parse_quantity("3"), Some(3));
        assert_eq!(parse_quantity(" 12 "), Some(12));
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("0"), None);
        assert_eq!(parse_quantity("-2"), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("1.5"), None);
        assert_eq!(parse_quantity("99999999999"), None);
    }

    #[test]
    fn from_form_skips_unpurchased_products() {
        let a = ProductId::new();
        let b = ProductId::new();
        let c = ProductId::new();
        let lines = RequestedLines::from_form([(a, "2"), (b, "0"), (c, "x")]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines.purchased().collect::<Vec<_>>(), vec![(a, 2)]);
    }

    #[test]
    fn purchased_iterates_in_ascending_id_order() {
        let mut ids: Vec<ProductId> = (0..5).map(|_| ProductId::new()).collect();
        let lines: RequestedLines = ids.iter().rev().map(|id| (*id, 1)).collect();
        ids.sort();
        let seen: Vec<ProductId> = lines.purchased().map(|(id, _)| id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn set_zero_removes_product() {
        let id = ProductId::new();
        let mut lines = RequestedLines::new();
        lines.set(id, 4);
        lines.set(id, 0);
        assert!(lines.is_empty());
    }
}
