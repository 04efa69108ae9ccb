//! # Cart Model
//!
//! The in-progress set of items a cashier intends to sell.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Operation               Cart Change           │
//! │  ───────────────          ─────────               ───────────           │
//! │                                                                         │
//! │  Tap product ────────────► add_item() ──────────► new line, or qty + 1 │
//! │                                                                         │
//! │  Change quantity ────────► set_quantity() ──────► qty = n (≤ 0 removes)│
//! │                                                                         │
//! │  Type a note ────────────► set_note() ──────────► note replaced        │
//! │                                                                         │
//! │  Click remove ───────────► remove_item() ───────► line dropped         │
//! │                                                                         │
//! │  Sale done / abandoned ──► clear() ─────────────► no lines             │
//! │                                                                         │
//! │  NOTE: total() is derived from the lines on every call.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - One line per catalog product id
//! - Every line has `quantity >= 1`
//! - `unit_price` and `name` are frozen when the line is created

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::sale::SaleLine;
use crate::types::{CatalogProduct, StockUpdate};
use crate::validation::{validate_quantity, MAX_LINE_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the cart.
///
/// ## Design Notes
/// - `id`: cart-local handle used by every line operation
/// - `product_id`: catalog identity, used to merge repeated adds
/// - `added_since_last_view`: drives the "+N new" badge, reset by
///   [`Cart::mark_viewed`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub id: String,

    pub product_id: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Price at time of adding (frozen)
    pub unit_price: Money,

    /// 1..=MAX_LINE_QUANTITY
    pub quantity: i64,

    pub note: Option<String>,

    pub added_since_last_view: i64,
}

impl CartLine {
    fn from_product(product: &CatalogProduct, quantity: i64) -> Self {
        CartLine {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            note: None,
            added_since_last_view: quantity,
        }
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }

    /// Badge counter moves by the signed delta, floored at 0.
    fn quantity_changed(&mut self, quantity: i64) {
        let delta = quantity - self.quantity;
        self.quantity = quantity;
        self.added_since_last_view = (self.added_since_last_view + delta).max(0);
    }

    /// Whether the "+N new" badge should show.
    #[inline]
    pub fn has_unseen_additions(&self) -> bool {
        self.added_since_last_view > 0
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
///
/// Owned by one checkout session. Lines are only changed through the
/// methods below.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLine>,

    /// Id of a sale whose commit was sent for these exact lines but never
    /// confirmed. Any edit drops it.
    #[serde(skip)]
    #[ts(skip)]
    unconfirmed_sale_id: Option<String>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            unconfirmed_sale_id: None,
        }
    }

    /// Adds one unit of a product. Returns the line id.
    pub fn add_item(&mut self, product: &CatalogProduct) -> String {
        self.add_item_with_quantity(product, 1)
    }

    /// Adds `quantity` units of a product, merging into an existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity and badge counter grow by `quantity`
    /// - Product not in cart: new line at the end
    /// - `quantity` below 1 is treated as 1
    /// - a line stops growing at [`MAX_LINE_QUANTITY`]
    ///
    /// Never fails. Returns the line id.
    pub fn add_item_with_quantity(&mut self, product: &CatalogProduct, quantity: i64) -> String {
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        self.unconfirmed_sale_id = None;

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            let merged = (line.quantity + quantity).min(MAX_LINE_QUANTITY);
            line.added_since_last_view += merged - line.quantity;
            line.quantity = merged;
            return line.id.clone();
        }

        let line = CartLine::from_product(product, quantity);
        let id = line.id.clone();
        self.lines.push(line);
        id
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line
    /// - above [`MAX_LINE_QUANTITY`]: rejected, line unchanged
    /// - otherwise: badge counter moves by the signed delta, floored at 0
    pub fn set_quantity(&mut self, line_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return self.remove_item(line_id).map(|_| ());
        }

        let line = self.line_mut(line_id)?;
        validate_quantity(quantity)?;
        line.quantity_changed(quantity);
        self.unconfirmed_sale_id = None;
        Ok(())
    }

    /// Replaces the free-text note of a line. Empty text clears it.
    pub fn set_note(&mut self, line_id: &str, text: &str) -> CoreResult<()> {
        let line = self.line_mut(line_id)?;
        line.note = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        self.unconfirmed_sale_id = None;
        Ok(())
    }

    /// Removes a line and returns it.
    pub fn remove_item(&mut self, line_id: &str) -> CoreResult<CartLine> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;
        self.unconfirmed_sale_id = None;
        Ok(self.lines.remove(index))
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.unconfirmed_sale_id = None;
    }

    /// Remembers the id of a sale that may have been written for this cart.
    ///
    /// A later checkout of the unchanged cart reuses it, so the store sees
    /// the same sale twice instead of two sales.
    pub fn hold_unconfirmed_sale(&mut self, sale_id: impl Into<String>) {
        self.unconfirmed_sale_id = Some(sale_id.into());
    }

    pub fn unconfirmed_sale_id(&self) -> Option<&str> {
        self.unconfirmed_sale_id.as_deref()
    }

    /// Resets every "+N new" badge.
    pub fn mark_viewed(&mut self) {
        for line in &mut self.lines {
            line.added_since_last_view = 0;
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.id == line_id)
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ unit_price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Ordered value snapshot of the lines, as stored on a sale.
    pub fn to_sale_lines(&self) -> Vec<SaleLine> {
        self.lines
            .iter()
            .enumerate()
            .map(|(position, line)| SaleLine {
                position: position as i64,
                product_id: line.product_id.clone(),
                product_name: line.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                line_total: line.line_total(),
                note: line.note.clone(),
            })
            .collect()
    }

    /// Stock decrements for settling this cart.
    pub fn to_stock_updates(&self) -> Vec<StockUpdate> {
        self.lines
            .iter()
            .map(|l| StockUpdate {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
            })
            .collect()
    }

    fn line_mut(&mut self, line_id: &str) -> CoreResult<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))
    }
}

/// Cart totals summary for UI responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total: cart.total(),
        }
    }
}
