use std::fmt::Write;
use storefront_store::Product;
use tokio::sync::RwLock;

const INSTRUCTIONS: &str = "Help customers by:
1. Answering questions about product availability, prices, and features
2. Making product recommendations based on customer needs
3. Being polite and professional at all times
4. If asked about a product not in the inventory, politely inform that it's not available

When listing products or information:
1. Always use numbered lists (1., 2., 3., etc.)
2. Present one product per line
3. Include the key information: name, price, and stock
4. Add relevant details like specifications when asked

Keep responses concise, organized, and focused on the inventory information provided.";

/// System instruction embedding the catalog as plain text
pub fn build_inventory_prompt(products: &[Product]) -> String {
    let mut inventory = String::new();
    for (i, product) in products.iter().enumerate() {
        if i > 0 {
            inventory.push('\n');
        }
        let _ = write!(
            inventory,
            "{}. {}: ${}, Stock: {}\n   {}",
            i + 1,
            product.name,
            product.price,
            product.stock,
            product.description
        );
    }

    format!(
        "You are a helpful e-commerce assistant. You have access to the following inventory:\n\n{inventory}\n\n{INSTRUCTIONS}"
    )
}

/// Current system instruction, regenerated whenever the catalog changes
pub struct InventoryPrompt {
    text: RwLock<String>,
}

impl InventoryPrompt {
    pub fn new(products: &[Product]) -> Self {
        Self { text: RwLock::new(build_inventory_prompt(products)) }
    }

    pub async fn current(&self) -> String {
        self.text.read().await.clone()
    }

    pub async fn refresh(&self, products: &[Product]) {
        let prompt = build_inventory_prompt(products);
        *self.text.write().await = prompt;
        tracing::debug!(products = products.len(), "Refreshed inventory prompt");
    }
}

impl Default for InventoryPrompt {
    fn default() -> Self {
        Self::new(&[])
    }
}
