//! # Checkout Pipeline
//!
//! Numbering, persistence and settlement for one sale, in that order.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          checkout(cart, plan)                           │
//! │                                                                         │
//! │  1. cart empty? blank business/user id? ──────► Validation              │
//! │  2. plan.set_total(cart.total()); plan.breakdown() ─► Validation        │
//! │  3. reserve_order_number ─── timeout ─────────► Timeout (retryable)     │
//! │                          └── no counter ──────► SequenceMissing         │
//! │  4. commit_sale ─────────── timeout ──────────► Timeout (retryable)     │
//! │                          └── error ───────────► Persistence             │
//! │       unconfirmed: sale id kept on the cart, reused by the next try     │
//! │  ───────────────────── sale is final from here ─────────────────────    │
//! │  5. cart.clear()                                                        │
//! │  6. settle: decrement every line concurrently                           │
//! │       failed lines ─► backoff ─► retry ... ─► InventoryStatus::Pending  │
//! │                                                                         │
//! │  Steps 1-4 never touch the lines. Step 6 never fails the checkout.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use futures_util::future::join_all;
use tracing::{debug, error, info, warn};

use crate::error::{CheckoutError, CheckoutResult, CheckoutStep};
use crate::outcome::{CheckoutReceipt, InventoryStatus, PendingStock};
use crate::services::{CatalogService, LedgerStore, PaymentMethodDirectory};
use tillpoint_core::validation::{validate_business_id, validate_user_id, MIN_SPLIT_SLOTS};
use tillpoint_core::{Cart, CoreError, PaymentPlan, SaleDraft, StockLevel, StockUpdate};
use tillpoint_db::Database;

// =============================================================================
// Settings
// =============================================================================

/// Bounded exponential backoff for settlement retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Rounds after the first attempt.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// No retries: failed lines go straight to pending.
    pub fn none() -> Self {
        RetryPolicy {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_backoff,
            max_interval: self.max_backoff,
            multiplier: 2.0,
            max_elapsed_time: None,
            ..Default::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

/// Who sells, and how patient the pipeline is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub business_id: String,
    pub user_id: String,
    pub split_slots: usize,
    /// Limit for every store call.
    pub step_timeout: Duration,
    pub settlement_retry: RetryPolicy,
}

impl PipelineSettings {
    pub fn new(business_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        PipelineSettings {
            business_id: business_id.into(),
            user_id: user_id.into(),
            split_slots: MIN_SPLIT_SLOTS,
            step_timeout: Duration::from_secs(5),
            settlement_retry: RetryPolicy::default(),
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

struct LineFailure {
    reason: String,
    retryable: bool,
}

/// Drives a cart to a committed sale.
///
/// ## Usage
/// ```rust,ignore
/// let pipeline = CheckoutPipeline::with_database(db, config.pipeline_settings());
///
/// pipeline.add_product(&mut cart, "BEV-000", 2).await?;
/// let mut plan = pipeline.payment_plan(&cart).await?;
/// plan.set_amount_received("20");
///
/// let outcome = CheckoutOutcome::from(pipeline.checkout(&mut cart, &mut plan).await);
/// ```
#[derive(Clone)]
pub struct CheckoutPipeline {
    catalog: Arc<dyn CatalogService>,
    directory: Arc<dyn PaymentMethodDirectory>,
    ledger: Arc<dyn LedgerStore>,
    settings: PipelineSettings,
}

impl std::fmt::Debug for CheckoutPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutPipeline")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CheckoutPipeline {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        directory: Arc<dyn PaymentMethodDirectory>,
        ledger: Arc<dyn LedgerStore>,
        settings: PipelineSettings,
    ) -> Self {
        CheckoutPipeline {
            catalog,
            directory,
            ledger,
            settings,
        }
    }

    /// All three services backed by one SQLite database.
    pub fn with_database(db: Database, settings: PipelineSettings) -> Self {
        let db = Arc::new(db);
        CheckoutPipeline::new(db.clone(), db.clone(), db, settings)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs a store call under the step timeout.
    async fn within<T, F>(&self, step: CheckoutStep, call: F) -> CheckoutResult<T>
    where
        F: Future<Output = T>,
    {
        tokio::time::timeout(self.settings.step_timeout, call)
            .await
            .map_err(|_| CheckoutError::Timeout {
                step,
                after: self.settings.step_timeout,
            })
    }

    /// Looks a product up and adds it to the cart at today's price.
    ///
    /// Returns the id of the cart line that now holds it.
    pub async fn add_product(
        &self,
        cart: &mut Cart,
        product_id: &str,
        quantity: i64,
    ) -> CheckoutResult<String> {
        let product = self
            .within(
                CheckoutStep::Lookup,
                self.catalog.get_product(&self.settings.business_id, product_id),
            )
            .await?
            .map_err(CheckoutError::Lookup)?
            .ok_or_else(|| CheckoutError::UnknownProduct {
                product_id: product_id.to_string(),
            })?;

        debug!(product_id = %product.id, price = %product.price, quantity, "Adding product to cart");
        Ok(cart.add_item_with_quantity(&product, quantity))
    }

    /// A fresh payment plan for the cart, offering the active methods.
    pub async fn payment_plan(&self, cart: &Cart) -> CheckoutResult<PaymentPlan> {
        let catalog = self
            .within(
                CheckoutStep::Lookup,
                self.directory.method_catalog(&self.settings.business_id),
            )
            .await?
            .map_err(CheckoutError::Lookup)?;

        if catalog.is_empty() {
            warn!(business_id = %self.settings.business_id, "No active payment methods");
        }

        Ok(PaymentPlan::new(
            cart.total(),
            &catalog,
            self.settings.split_slots,
        ))
    }

    /// Completes the sale.
    ///
    /// The plan is re-validated against the current cart total. On any error
    /// the cart is left exactly as it was. On success the cart is empty and
    /// the receipt says whether inventory settled.
    pub async fn checkout(
        &self,
        cart: &mut Cart,
        plan: &mut PaymentPlan,
    ) -> CheckoutResult<CheckoutReceipt> {
        let business_id = self.settings.business_id.as_str();

        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        validate_business_id(business_id)?;
        validate_user_id(&self.settings.user_id)?;
        plan.set_total(cart.total());
        let breakdown = plan.breakdown()?;
        let change = plan.change();
        let lines = cart.to_sale_lines();
        let updates = cart.to_stock_updates();

        info!(
            business_id = %business_id,
            lines = lines.len(),
            total = %cart.total(),
            split = breakdown.split,
            "Checkout started"
        );

        let order_number = self
            .within(
                CheckoutStep::Numbering,
                self.ledger.reserve_order_number(business_id),
            )
            .await?
            .map_err(CheckoutError::from_numbering)?;

        let mut draft = SaleDraft::new(
            business_id,
            &self.settings.user_id,
            lines,
            breakdown,
            order_number,
        )?;
        if let Some(sale_id) = cart.unconfirmed_sale_id() {
            debug!(sale_id, "Reusing id of an unconfirmed commit");
            draft = draft.with_id(sale_id);
        }

        let committed = self
            .within(CheckoutStep::Persistence, self.ledger.commit_sale(&draft))
            .await
            .and_then(|result| result.map_err(CheckoutError::Persistence));
        let sale = match committed {
            Ok(sale) => sale,
            Err(err) => {
                warn!(sale_id = %draft.id, error = %err, "Sale commit unconfirmed");
                cart.hold_unconfirmed_sale(draft.id);
                return Err(err);
            }
        };

        info!(
            sale_id = %sale.id,
            order_number = %sale.order_number,
            total = %sale.total,
            "Sale committed"
        );

        cart.clear();

        let inventory = self.settle(updates).await;

        Ok(CheckoutReceipt {
            sale,
            change,
            inventory,
        })
    }

    /// Tries the pending decrements of an earlier sale again.
    pub async fn retry_settlement(&self, pending: &[PendingStock]) -> InventoryStatus {
        info!(lines = pending.len(), "Retrying inventory settlement");
        self.settle(pending.iter().map(PendingStock::to_update).collect())
            .await
    }

    /// Decrements every line, retrying transient failures with backoff.
    async fn settle(&self, updates: Vec<StockUpdate>) -> InventoryStatus {
        let policy = &self.settings.settlement_retry;
        let mut backoff = policy.backoff();
        let mut levels: Vec<StockLevel> = Vec::with_capacity(updates.len());
        let mut pending: Vec<PendingStock> = Vec::new();
        let mut remaining = updates;
        let mut attempt: u32 = 0;

        loop {
            let results = join_all(remaining.iter().map(|u| self.decrement_line(u))).await;

            let mut retry: Vec<(StockUpdate, String)> = Vec::new();
            for (update, result) in remaining.into_iter().zip(results) {
                match result {
                    Ok(level) => levels.push(level),
                    Err(failure) => {
                        warn!(
                            product_id = %update.product_id,
                            quantity = update.quantity,
                            attempt,
                            reason = %failure.reason,
                            "Stock decrement failed"
                        );
                        if failure.retryable {
                            retry.push((update, failure.reason));
                        } else {
                            pending.push(pending_line(update, failure.reason));
                        }
                    }
                }
            }

            if retry.is_empty() {
                break;
            }

            let wait = if attempt < policy.max_retries {
                backoff.next_backoff()
            } else {
                None
            };
            let Some(wait) = wait else {
                pending.extend(retry.into_iter().map(|(u, reason)| pending_line(u, reason)));
                break;
            };

            attempt += 1;
            debug!(?wait, attempt, lines = retry.len(), "Retrying stock decrements");
            tokio::time::sleep(wait).await;
            remaining = retry.into_iter().map(|(u, _)| u).collect();
        }

        for level in levels.iter().filter(|l| l.is_low() || l.is_out()) {
            info!(
                product_id = %level.product_id,
                current_stock = level.current_stock,
                min_stock = level.min_stock,
                "Low stock after sale"
            );
        }

        if pending.is_empty() {
            debug!(lines = levels.len(), "Inventory settled");
            InventoryStatus::Settled { levels }
        } else {
            error!(
                settled = levels.len(),
                pending = pending.len(),
                "Inventory settlement incomplete"
            );
            InventoryStatus::Pending { levels, pending }
        }
    }

    async fn decrement_line(&self, update: &StockUpdate) -> Result<StockLevel, LineFailure> {
        match self
            .within(
                CheckoutStep::Settlement,
                self.ledger
                    .decrement_stock(&self.settings.business_id, update),
            )
            .await
        {
            Ok(Ok(level)) => Ok(level),
            Ok(Err(err)) => Err(LineFailure {
                retryable: err.is_retryable(),
                reason: err.to_string(),
            }),
            Err(timeout) => Err(LineFailure {
                reason: timeout.to_string(),
                retryable: true,
            }),
        }
    }
}

fn pending_line(update: StockUpdate, reason: String) -> PendingStock {
    PendingStock {
        product_id: update.product_id,
        quantity: update.quantity,
        reason,
    }
}
