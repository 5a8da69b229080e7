use crate::models::Product;
use crate::money::Money;

/// Read-only product catalog. The storefront ships a fixed apparel line; the
/// API serves the same list and resolves ids for the cart.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
}

fn product(
    id: &str,
    name: &str,
    price: i64,
    original_price: Option<i64>,
    image: &str,
    sizes: &[&str],
    category: &str,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::rupees(price),
        original_price: original_price.map(Money::rupees),
        image: image.to_string(),
        sizes: sizes.iter().map(|s| s.to_string()).collect(),
        category: category.to_string(),
    }
}

impl Catalog {
    pub fn seeded() -> Self {
        let products = vec![
            product(
                "optimus-prime",
                "Optimus Prime Heritage",
                1299,
                Some(1799),
                "/images/products/optimus.png",
                &["S", "M", "L", "XL", "XXL"],
                "autobots",
            ),
            product(
                "bumblebee-chibi",
                "Bumblebee Chibi Edition",
                999,
                Some(1499),
                "/images/products/bumblebee.png",
                &["S", "M", "L", "XL"],
                "autobots",
            ),
            product(
                "megatron-rise",
                "Megatron Dark Rise",
                1399,
                None,
                "/images/products/megatron.png",
                &["M", "L", "XL", "XXL"],
                "decepticons",
            ),
            product(
                "autobot-insignia",
                "Autobot Insignia Classic",
                899,
                None,
                "/images/products/autobot-logo.png",
                &["S", "M", "L", "XL", "XXL"],
                "autobots",
            ),
            product(
                "decepticon-cyber",
                "Decepticon Cyber Emblem",
                1499,
                None,
                "/images/products/decepticon.png",
                &["S", "M", "L", "XL"],
                "decepticons",
            ),
            product(
                "retro-squad",
                "Retro Squad '84",
                1199,
                None,
                "/images/products/retro.png",
                &["S", "M", "L", "XL", "XXL"],
                "classics",
            ),
        ];
        Self { products }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id() {
        let catalog = Catalog::seeded();
        let tee = catalog.get("optimus-prime").unwrap();
        assert_eq!(tee.price, Money::rupees(1299));
        assert!(tee.sizes.contains(&"L".to_string()));
        assert!(catalog.get("nonexistent").is_none());
    }

    #[test]
    fn every_product_has_sizes() {
        for p in Catalog::seeded().all() {
            assert!(!p.sizes.is_empty(), "{} has no sizes", p.id);
        }
    }
}
