//! # Cart State
//!
//! The session's cart, shared between the operator's actions.
//!
//! ## Thread Safety
//! The cart lives behind `Arc<tokio::sync::Mutex<Cart>>`. A checkout holds the
//! lock from validation to `clear()`, so no edit can slip in between the
//! snapshot that was sold and the cart being emptied.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Operator Action          CartState               Cart Change           │
//! │  ───────────────          ─────────               ───────────           │
//! │                                                                         │
//! │  Tap product ────────────► add_product() ───────► line added/merged    │
//! │  Change quantity ────────► with_cart_mut() ─────► set_quantity()       │
//! │  View cart ──────────────► totals() ────────────► (read only)          │
//! │  Complete sale ──────────► checkout() ──────────► cleared on success   │
//! │                                                                         │
//! │  checkout() keeps the lock across every await of the pipeline.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::CheckoutResult;
use crate::outcome::CheckoutOutcome;
use crate::pipeline::CheckoutPipeline;
use tillpoint_core::{Cart, CartTotals, PaymentPlan};

/// Shared handle to the session cart.
#[derive(Debug, Clone)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState {
            cart: Arc::new(Mutex::new(Cart::new())),
        }
    }

    /// Exclusive access for as long as the guard lives.
    pub async fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().await
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let lines = cart_state.with_cart(|cart| cart.lines().to_vec()).await;
    /// ```
    pub async fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().await;
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart_state.with_cart_mut(|cart| cart.set_quantity(&line_id, 3)).await?;
    /// ```
    pub async fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().await;
        f(&mut cart)
    }

    pub async fn totals(&self) -> CartTotals {
        self.with_cart(|cart| CartTotals::from(cart)).await
    }

    /// Looks the product up and adds it. Returns the line id.
    pub async fn add_product(
        &self,
        pipeline: &CheckoutPipeline,
        product_id: &str,
        quantity: i64,
    ) -> CheckoutResult<String> {
        let mut cart = self.cart.lock().await;
        pipeline.add_product(&mut cart, product_id, quantity).await
    }

    /// Payment plan for the current total.
    pub async fn payment_plan(&self, pipeline: &CheckoutPipeline) -> CheckoutResult<PaymentPlan> {
        let cart = self.cart.lock().await;
        pipeline.payment_plan(&cart).await
    }

    /// Completes the sale and reports it the way the operator sees it.
    pub async fn checkout(
        &self,
        pipeline: &CheckoutPipeline,
        plan: &mut PaymentPlan,
    ) -> CheckoutOutcome {
        let mut cart = self.cart.lock().await;
        CheckoutOutcome::from(pipeline.checkout(&mut cart, plan).await)
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::{CatalogProduct, Money};

    #[tokio::test]
    async fn test_with_cart_mut_and_totals() {
        let state = CartState::new();
        let product = CatalogProduct::new("p1", "Bagel", Money::from_cents(250));

        let line_id = state
            .with_cart_mut(|cart| cart.add_item_with_quantity(&product, 2))
            .await;
        state
            .with_cart_mut(|cart| cart.set_quantity(&line_id, 3))
            .await
            .unwrap();

        let totals = state.totals().await;
        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 3);
        assert_eq!(totals.total, Money::from_cents(750));
    }

    #[tokio::test]
    async fn test_clones_share_one_cart() {
        let state = CartState::new();
        let other = state.clone();
        let product = CatalogProduct::new("p1", "Bagel", Money::from_cents(250));

        other.with_cart_mut(|cart| cart.add_item(&product)).await;

        assert!(!state.with_cart(|cart| cart.is_empty()).await);
    }
}
