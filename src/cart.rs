use serde::Serialize;
use utoipa::ToSchema;

use crate::models::Product;
use crate::money::Money;

/// One (product, size) pairing with a quantity. The `(product.id, size)`
/// pair is unique within a cart.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartLine {
    pub product: Product,
    pub size: String,
    pub quantity: i32,
}

/// Session-scoped cart. Totals are derived on every read; nothing cached.
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Increment the matching line by one, or append a fresh line with
    /// quantity 1. Always succeeds.
    pub fn add_item(&mut self, product: Product, size: &str) {
        if let Some(line) = self.find_mut(&product.id, size) {
            line.quantity += 1;
            return;
        }
        self.lines.push(CartLine {
            product,
            size: size.to_string(),
            quantity: 1,
        });
    }

    /// Delete the matching line. Absence is a no-op, not an error.
    pub fn remove_item(&mut self, product_id: &str, size: &str) {
        self.lines
            .retain(|line| !(line.product.id == product_id && line.size == size));
    }

    /// Absolute set. A quantity of zero or below is a deletion trigger.
    pub fn update_quantity(&mut self, product_id: &str, size: &str, quantity: i32) {
        if quantity <= 0 {
            self.remove_item(product_id, size);
            return;
        }
        if let Some(line) = self.find_mut(product_id, size) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart. Called once per checkout, after a verified payment.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity as i64).sum()
    }

    pub fn total_price(&self) -> Money {
        self.lines
            .iter()
            .map(|line| line.product.price * line.quantity as i64)
            .sum()
    }

    fn find_mut(&mut self, product_id: &str, size: &str) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product_id && line.size == size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn tee(id: &str) -> Product {
        Catalog::seeded().get(id).cloned().unwrap()
    }

    #[test]
    fn adding_same_product_and_size_increments_one_line() {
        let mut cart = Cart::default();
        cart.add_item(tee("optimus-prime"), "L");
        cart.add_item(tee("optimus-prime"), "L");

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn same_product_different_size_gets_its_own_line() {
        let mut cart = Cart::default();
        cart.add_item(tee("optimus-prime"), "L");
        cart.add_item(tee("optimus-prime"), "M");

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.total_items(), 2);
    }

    #[test]
    fn zero_and_negative_quantity_both_delete() {
        let mut cart = Cart::default();
        cart.add_item(tee("bumblebee-chibi"), "M");
        cart.update_quantity("bumblebee-chibi", "M", 0);
        assert!(cart.is_empty());

        cart.add_item(tee("bumblebee-chibi"), "M");
        cart.update_quantity("bumblebee-chibi", "M", -1);
        assert!(cart.is_empty());

        // Deleting what is not there is a no-op.
        cart.update_quantity("bumblebee-chibi", "M", 0);
        cart.remove_item("bumblebee-chibi", "M");
        assert!(cart.is_empty());
    }

    #[test]
    fn update_is_an_absolute_set() {
        let mut cart = Cart::default();
        cart.add_item(tee("megatron-rise"), "XL");
        cart.add_item(tee("megatron-rise"), "XL");
        cart.update_quantity("megatron-rise", "XL", 5);

        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn totals_recompute_after_every_mutation() {
        let mut cart = Cart::default();
        cart.add_item(tee("optimus-prime"), "L"); // 1299
        cart.add_item(tee("optimus-prime"), "L"); // 2598
        cart.add_item(tee("bumblebee-chibi"), "M"); // 3597

        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), Money::rupees(3597));

        cart.update_quantity("optimus-prime", "L", 1);
        assert_eq!(cart.total_price(), Money::rupees(2298));

        cart.remove_item("bumblebee-chibi", "M");
        assert_eq!(cart.total_price(), Money::rupees(1299));
        assert_eq!(cart.total_items(), 1);

        cart.clear();
        assert_eq!(cart.total_price(), Money::ZERO);
        assert_eq!(cart.total_items(), 0);
    }
}
