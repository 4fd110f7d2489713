//! Dialogue Orchestrator
//!
//! Routes each utterance to the intent parser or the improv state machine,
//! mutates the per-conversation state, and returns a single reply string.
//! Every branch replies; no input terminates the conversation. Lookup misses
//! come back as clarifying sentences and an empty-cart order attempt is a
//! business-rule rejection, not an error.

use crate::cart::Cart;
use crate::catalog::Catalog;
use crate::improv::ImprovSession;
use crate::intent::{self, Intent};
use crate::ledger::OrderLedger;
use crate::recipe::RecipeBook;
use tracing::{info, warn};

/// Read-only collaborators shared across all conversations.
pub struct TurnContext<'a> {
    pub catalog: &'a Catalog,
    pub recipes: &'a RecipeBook,
    pub currency: &'a str,
}

/// The shopping half of the orchestrator: one cart per conversation.
#[derive(Default)]
pub struct ShoppingAgent {
    cart: Cart,
}

impl ShoppingAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub async fn handle_utterance(
        &mut self,
        text: &str,
        ctx: &TurnContext<'_>,
        ledger: &mut dyn OrderLedger,
    ) -> String {
        let intent = intent::classify(text);
        info!(?intent, "classified utterance");
        match intent {
            Intent::Add { quantity, item } => self.add_item(&item, quantity, ctx),
            Intent::RecipeRequest { dish } => self.add_recipe(&dish, ctx),
            Intent::Remove { item } => self.remove_item(&item, ctx),
            Intent::Update { item, quantity } => self.update_item(&item, quantity, ctx),
            Intent::ShowCart => self.show_cart(ctx),
            Intent::PlaceOrder => self.place_order(ctx, ledger).await,
            Intent::Browse => browse(ctx),
            Intent::Unknown => {
                "Sorry, I didn't catch that. You can add items, ask for a recipe's ingredients, \
                 review your cart, or place your order."
                    .to_string()
            }
        }
    }

    fn add_item(&mut self, item: &str, quantity: u32, ctx: &TurnContext<'_>) -> String {
        match ctx.catalog.resolve(item) {
            Some(product) => {
                self.cart.add(product, quantity, None);
                format!(
                    "Added {quantity} x {} to your cart. Cart total is {} {}.",
                    product.name,
                    self.cart.snapshot().total,
                    ctx.currency
                )
            }
            None => format!(
                "I couldn't find \"{item}\" in our catalog. Could you try a different name?"
            ),
        }
    }

    fn add_recipe(&mut self, dish: &str, ctx: &TurnContext<'_>) -> String {
        match ctx.recipes.resolve(dish, ctx.catalog) {
            Some(products) if products.is_empty() => {
                format!("I know {dish}, but none of its ingredients are in stock right now.")
            }
            Some(products) => {
                let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
                for product in &products {
                    self.cart.add(product, 1, None);
                }
                format!(
                    "Added {} items for {dish}: {}.",
                    names.len(),
                    names.join(", ")
                )
            }
            None => format!("I don't have a recipe for \"{dish}\". Maybe try another dish?"),
        }
    }

    fn remove_item(&mut self, item: &str, ctx: &TurnContext<'_>) -> String {
        match ctx.catalog.resolve(item) {
            Some(product) => {
                if self.cart.remove(&product.id) {
                    format!("Removed {} from your cart.", product.name)
                } else {
                    format!("{} isn't in your cart.", product.name)
                }
            }
            None => format!("I couldn't find \"{item}\" in our catalog."),
        }
    }

    fn update_item(&mut self, item: &str, quantity: u32, ctx: &TurnContext<'_>) -> String {
        match ctx.catalog.resolve(item) {
            Some(product) => {
                if !self.cart.update_quantity(&product.id, quantity) {
                    format!("{} isn't in your cart yet.", product.name)
                } else if quantity == 0 {
                    format!("Removed {} from your cart.", product.name)
                } else {
                    format!("Set {} to {quantity}.", product.name)
                }
            }
            None => format!("I couldn't find \"{item}\" in our catalog."),
        }
    }

    fn show_cart(&self, ctx: &TurnContext<'_>) -> String {
        let snapshot = self.cart.snapshot();
        if snapshot.is_empty() {
            return "Your cart is empty.".to_string();
        }
        let mut reply = String::from("Here's your cart:\n");
        for (i, line) in snapshot.lines.iter().enumerate() {
            reply.push_str(&format!(
                "{}. {} x {} - {} {}\n",
                i + 1,
                line.name,
                line.quantity,
                line.subtotal(),
                ctx.currency
            ));
        }
        reply.push_str(&format!("Total: {} {}.", snapshot.total, ctx.currency));
        reply
    }

    async fn place_order(
        &mut self,
        ctx: &TurnContext<'_>,
        ledger: &mut dyn OrderLedger,
    ) -> String {
        if self.cart.is_empty() {
            return "There's nothing to place just yet: your cart is empty.".to_string();
        }
        let snapshot = self.cart.snapshot();
        match ledger.place(&snapshot, ctx.currency).await {
            Ok(order) => {
                self.cart.clear();
                info!(order_id = order.id, total = order.total, "order placed");
                format!(
                    "Order #{} placed! {} item(s), total {} {}. Thank you!",
                    order.id,
                    order.lines.len(),
                    order.total,
                    order.currency
                )
            }
            Err(error) => {
                warn!(?error, "failed to record order");
                "I couldn't record your order just now. Your cart is untouched, so please try again."
                    .to_string()
            }
        }
    }
}

fn browse(ctx: &TurnContext<'_>) -> String {
    if ctx.catalog.is_empty() {
        return "The shelves are bare today. Check back soon!".to_string();
    }
    let listing: Vec<String> = ctx
        .catalog
        .products()
        .iter()
        .take(8)
        .map(|p| format!("{} ({} {})", p.name, p.price, ctx.currency))
        .collect();
    format!("Here's some of what we have: {}.", listing.join(", "))
}

/// Per-conversation state object: constructed at session start, destroyed at
/// session end. Owns all mutable state for the conversation.
pub enum Conversation {
    Shopping(ShoppingAgent),
    Improv(ImprovSession),
}

impl Conversation {
    pub fn shopping() -> Self {
        Self::Shopping(ShoppingAgent::new())
    }

    pub fn improv(max_rounds: u32) -> Self {
        Self::Improv(ImprovSession::new(max_rounds))
    }

    /// The opening line sent right after session initialization.
    pub fn greeting(&self) -> String {
        match self {
            Self::Shopping(_) => {
                "Welcome to the pantry! Tell me what to add, or ask what we have.".to_string()
            }
            Self::Improv(session) => session.greeting(),
        }
    }

    /// Sole turn entry point: one utterance in, one reply out.
    pub async fn handle_utterance(
        &mut self,
        text: &str,
        ctx: &TurnContext<'_>,
        ledger: &mut dyn OrderLedger,
    ) -> String {
        match self {
            Self::Shopping(agent) => agent.handle_utterance(text, ctx, ledger).await,
            Self::Improv(session) => session.handle_turn(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{MemoryLedger, MockOrderLedger};
    use crate::recipe::RecipeBook;

    fn ctx<'a>(catalog: &'a Catalog, recipes: &'a RecipeBook) -> TurnContext<'a> {
        TurnContext {
            catalog,
            recipes,
            currency: "INR",
        }
    }

    #[tokio::test]
    async fn add_show_place_scenario() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent.handle_utterance("add 2 bread", &ctx, &mut ledger).await;
        assert!(reply.contains("Whole Wheat Bread"));
        let snap = agent.cart().snapshot();
        assert_eq!(snap.lines.len(), 1);
        assert_eq!(snap.lines[0].quantity, 2);
        assert_eq!(snap.lines[0].subtotal(), 80);

        let reply = agent
            .handle_utterance("show my cart", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("80"));

        let reply = agent
            .handle_utterance("place my order", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("Order #1"));
        assert!(agent.cart().is_empty());

        let orders = ledger.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, 1);
        assert_eq!(orders[0].total, 80);
    }

    #[tokio::test]
    async fn recipe_request_adds_each_resolved_item_once() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent
            .handle_utterance("ingredients for pasta for two", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("3 items"));

        let snap = agent.cart().snapshot();
        assert_eq!(snap.lines.len(), 3);
        assert!(snap.lines.iter().all(|l| l.quantity == 1));
        let ids: Vec<&str> = snap.lines.iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["pasta", "pasta_sauce", "butter"]);
    }

    #[tokio::test]
    async fn empty_cart_order_is_rejected_without_touching_the_ledger() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        // No expectations set: any `place` call would panic the test.
        let mut ledger = MockOrderLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent
            .handle_utterance("place my order", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("nothing to place"));
    }

    #[tokio::test]
    async fn lookup_miss_is_a_clarifying_reply() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent
            .handle_utterance("add 2 dragon fruit", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("couldn't find"));
        assert!(agent.cart().is_empty());

        let reply = agent
            .handle_utterance("ingredients for sushi platter", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("don't have a recipe"));
    }

    #[tokio::test]
    async fn remove_and_update_report_missing_lines() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent
            .handle_utterance("remove bread", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("isn't in your cart"));

        agent.handle_utterance("add 2 bread", &ctx, &mut ledger).await;
        let reply = agent
            .handle_utterance("set bread to 0", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("Removed"));
        assert!(agent.cart().is_empty());
    }

    #[tokio::test]
    async fn unknown_utterance_gets_the_fallback_reply() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();
        let mut agent = ShoppingAgent::new();

        let reply = agent
            .handle_utterance("quack quack", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("didn't catch that"));
    }

    #[tokio::test]
    async fn improv_conversation_routes_to_the_state_machine() {
        let catalog = Catalog::default_stock();
        let recipes = RecipeBook::default_recipes();
        let ctx = ctx(&catalog, &recipes);
        let mut ledger = MemoryLedger::new();

        let mut conversation = Conversation::improv(3);
        assert!(conversation.greeting().contains("improv"));
        let reply = conversation
            .handle_utterance("Alex", &ctx, &mut ledger)
            .await;
        assert!(reply.contains("Alex"));
        assert!(ledger.orders().is_empty());
    }
}
