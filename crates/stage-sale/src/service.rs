//! # Crowdsale Service
//!
//! Wires the domain to the driven ports and implements [`CrowdsaleApi`].
//!
//! ## Atomicity
//!
//! All sale state lives in one `SaleState` behind a single async mutex.
//! Every operation holds the lock from its first check to its final commit,
//! including across calls to the payment ledger and vesting registry, so
//! operations are totally ordered and never observe each other half-done.
//!
//! Counter updates are staged on a copy of the state and swapped in only
//! after every external effect succeeded. A purchase credits vesting before
//! it pulls payment; if the payment then fails, the credit is cancelled, so
//! a rejected purchase never touches the buyer's balance or allowance.

use crate::adapters::{InMemoryEventBus, InMemoryPaymentLedger, InMemoryVestingRegistry};
use crate::config::SaleConfig;
use crate::domain::access::Operator;
use crate::domain::entities::{Purchase, SaleInfo, Stage};
use crate::domain::invariants::{check_all_invariants, InvariantCheckResult};
use crate::domain::services::checked_add;
use crate::domain::stage_controller::StageController;
use crate::domain::value_objects::{format_units, Address, U256};
use crate::errors::{ConfigError, SaleError, TokenError};
use crate::events::SaleEvent;
use crate::ports::inbound::CrowdsaleApi;
use crate::ports::outbound::{EventPublisher, PaymentLedger, VestingRegistry};

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};

/// Crowdsale service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Check domain invariants after every committed operation.
    pub check_invariants: bool,
    /// Treat `withdrawn > collected` as a violation. Only meaningful when
    /// the sale address receives payment tokens exclusively via purchases.
    pub strict_treasury: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            check_invariants: true,
            strict_treasury: false,
        }
    }
}

/// Statistics for the crowdsale service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Purchases settled.
    pub purchases_settled: u64,
    /// Purchases rejected for any reason.
    pub purchases_rejected: u64,
    /// Sale-token base units sold.
    pub tokens_sold: U256,
    /// Payment-token base units collected.
    pub payment_collected: U256,
    /// Withdrawals executed.
    pub withdrawals: u64,
    /// Payment-token base units withdrawn.
    pub amount_withdrawn: U256,
    /// Successful stage changes.
    pub stage_changes: u64,
    /// Privileged calls rejected because the caller was not the operator.
    pub unauthorized_attempts: u64,
}

/// Mutable sale state. Only touched with the service mutex held.
#[derive(Debug, Clone)]
struct SaleState {
    controller: StageController,
    collected: U256,
    withdrawn: U256,
}

/// The crowdsale engine.
pub struct CrowdsaleService<P: PaymentLedger, V: VestingRegistry, E: EventPublisher> {
    config: ServiceConfig,
    operator: Operator,
    sale_address: Address,
    payment_token: Address,
    sale_token: Address,
    state: Mutex<SaleState>,
    ledger: Arc<P>,
    vesting: Arc<V>,
    events: Arc<E>,
    stats: RwLock<ServiceStats>,
}

impl<P: PaymentLedger, V: VestingRegistry, E: EventPublisher> CrowdsaleService<P, V, E> {
    /// Builds a sale in `Stage::None` from validated configuration.
    pub fn new(
        sale: &SaleConfig,
        ledger: Arc<P>,
        vesting: Arc<V>,
        events: Arc<E>,
        config: ServiceConfig,
    ) -> Result<Self, ConfigError> {
        sale.validate()?;
        let controller = StageController::new(sale.pricing_table()?, sale.supply_for_sale());

        info!(
            operator = %sale.operator,
            sale_address = %sale.sale_address,
            supply = %controller.remaining_supply(),
            "Crowdsale initialized"
        );

        Ok(Self {
            config,
            operator: Operator::new(sale.operator),
            sale_address: sale.sale_address,
            payment_token: sale.payment_token,
            sale_token: sale.sale_token,
            state: Mutex::new(SaleState {
                controller,
                collected: U256::zero(),
                withdrawn: U256::zero(),
            }),
            ledger,
            vesting,
            events,
            stats: RwLock::new(ServiceStats::default()),
        })
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Address holding the treasury.
    #[must_use]
    pub fn sale_address(&self) -> Address {
        self.sale_address
    }

    /// Payment ledger adapter.
    #[must_use]
    pub fn ledger(&self) -> &Arc<P> {
        &self.ledger
    }

    /// Vesting adapter.
    #[must_use]
    pub fn vesting(&self) -> &Arc<V> {
        &self.vesting
    }

    /// Event publisher adapter.
    #[must_use]
    pub fn events(&self) -> &Arc<E> {
        &self.events
    }

    /// Operator gate; counts rejected callers.
    async fn authorize(&self, caller: Address) -> Result<(), SaleError> {
        if let Err(err) = self.operator.authorize(caller) {
            warn!(%caller, "Rejected privileged call from non-operator");
            self.stats.write().await.unauthorized_attempts += 1;
            return Err(err);
        }
        Ok(())
    }

    fn check_invariants(&self, state: &SaleState) {
        if !self.config.check_invariants {
            return;
        }
        if let InvariantCheckResult::Invalid(violations) = check_all_invariants(
            &state.controller,
            state.collected,
            state.withdrawn,
            self.config.strict_treasury,
        ) {
            error!(?violations, "Sale invariant violated");
        }
    }

    /// Validation and settlement of one purchase. Holds the state lock for
    /// the whole call.
    async fn settle_purchase(
        &self,
        buyer: Address,
        amount: U256,
        referral: u64,
    ) -> Result<Purchase, SaleError> {
        if amount.is_zero() {
            return Err(SaleError::ZeroAmount);
        }
        if buyer == self.sale_address {
            return Err(SaleError::SelfPurchase);
        }

        let mut state = self.state.lock().await;
        let quote = state.controller.quote(amount)?;
        if quote.cost.is_zero() {
            return Err(SaleError::DustPurchase);
        }

        // Stage the counter updates first so nothing after the payment can fail.
        let mut next = state.clone();
        next.controller.commit(&quote)?;
        next.collected = checked_add(next.collected, quote.cost)?;

        let approved = self.ledger.allowance(buyer, self.sale_address).await?;
        if approved < quote.cost {
            return Err(SaleError::InsufficientAllowance {
                required: quote.cost,
                approved,
            });
        }

        // Same failure the ledger's transfer_from would report, raised
        // before anything is credited.
        let balance = self.ledger.balance_of(buyer).await?;
        if balance < quote.cost {
            return Err(TokenError::InsufficientBalance {
                owner: buyer,
                required: quote.cost,
                available: balance,
            }
            .into());
        }

        self.vesting.register_purchase(buyer, amount).await?;

        if let Err(err) = self
            .ledger
            .transfer_from(self.sale_address, buyer, self.sale_address, quote.cost)
            .await
        {
            warn!(%buyer, error = %err, "Payment failed, cancelling vesting credit");
            if let Err(cancel_err) = self.vesting.cancel_purchase(buyer, amount).await {
                error!(%buyer, amount = %amount, error = %cancel_err, "Vesting rollback failed");
                return Err(SaleError::RollbackFailed(cancel_err));
            }
            return Err(err.into());
        }

        *state = next;
        self.check_invariants(&state);

        let purchase = Purchase {
            buyer,
            amount,
            cost: quote.cost,
            stage: quote.stage,
            referral,
        };
        self.events
            .publish(SaleEvent::tokens_purchased(purchase.clone()))
            .await;
        Ok(purchase)
    }

    async fn execute_withdrawal(&self, amount: U256, aux: u64) -> Result<(), SaleError> {
        let to = self.operator.address();
        let mut state = self.state.lock().await;

        let available = self.ledger.balance_of(self.sale_address).await?;
        if amount > available {
            return Err(SaleError::InsufficientTreasuryFunds {
                requested: amount,
                available,
            });
        }
        let withdrawn = checked_add(state.withdrawn, amount)?;

        self.ledger.transfer(self.sale_address, to, amount).await?;
        state.withdrawn = withdrawn;
        self.check_invariants(&state);

        self.events
            .publish(SaleEvent::funds_withdrawn(to, amount, aux))
            .await;
        Ok(())
    }
}

#[async_trait]
impl<P: PaymentLedger, V: VestingRegistry, E: EventPublisher> CrowdsaleApi
    for CrowdsaleService<P, V, E>
{
    #[instrument(skip(self), fields(caller = %caller))]
    async fn set_stage(&self, caller: Address, raw_stage: u8) -> Result<(), SaleError> {
        self.authorize(caller).await?;
        let stage = Stage::try_from(raw_stage).inspect_err(|_| {
            debug!(raw_stage, "Rejected unknown stage");
        })?;

        {
            let mut state = self.state.lock().await;
            let previous = state.controller.set_stage(stage);
            self.events.publish(SaleEvent::stage_changed(stage)).await;
            info!(from = %previous, to = %stage, "Stage changed");
        }

        self.stats.write().await.stage_changes += 1;
        Ok(())
    }

    async fn current_stage(&self) -> Stage {
        self.state.lock().await.controller.current_stage()
    }

    async fn get_price(&self) -> Result<u64, SaleError> {
        self.state.lock().await.controller.price()
    }

    #[instrument(skip(self), fields(buyer = %buyer, amount = %amount))]
    async fn buy_token(
        &self,
        buyer: Address,
        amount: U256,
        referral: u64,
    ) -> Result<(), SaleError> {
        match self.settle_purchase(buyer, amount, referral).await {
            Ok(purchase) => {
                info!(
                    stage = %purchase.stage,
                    tokens = %format_units(purchase.amount),
                    cost = %format_units(purchase.cost),
                    referral,
                    "Purchase settled"
                );
                let mut stats = self.stats.write().await;
                stats.purchases_settled += 1;
                stats.tokens_sold = stats.tokens_sold.saturating_add(purchase.amount);
                stats.payment_collected = stats.payment_collected.saturating_add(purchase.cost);
                Ok(())
            }
            Err(err) => {
                if err.is_caller_error() {
                    debug!(error = %err, "Purchase rejected");
                } else {
                    warn!(error = %err, "Purchase failed in a collaborator");
                }
                self.stats.write().await.purchases_rejected += 1;
                Err(err)
            }
        }
    }

    #[instrument(skip(self), fields(caller = %caller, amount = %amount))]
    async fn withdraw(&self, caller: Address, amount: U256, aux: u64) -> Result<(), SaleError> {
        self.authorize(caller).await?;

        if let Err(err) = self.execute_withdrawal(amount, aux).await {
            debug!(error = %err, "Withdrawal rejected");
            return Err(err);
        }

        info!(amount = %format_units(amount), "Treasury withdrawal executed");
        let mut stats = self.stats.write().await;
        stats.withdrawals += 1;
        stats.amount_withdrawn = stats.amount_withdrawn.saturating_add(amount);
        Ok(())
    }

    async fn remaining_supply(&self) -> U256 {
        self.state.lock().await.controller.remaining_supply()
    }

    fn operator(&self) -> Address {
        self.operator.address()
    }

    async fn sale_info(&self) -> SaleInfo {
        let state = self.state.lock().await;
        SaleInfo {
            operator: self.operator.address(),
            sale_address: self.sale_address,
            payment_token: self.payment_token,
            sale_token: self.sale_token,
            stage: state.controller.current_stage(),
            price: state.controller.price().ok(),
            remaining_supply: state.controller.remaining_supply(),
            sold: state.controller.sold_by_stage(),
            collected: state.collected,
            withdrawn: state.withdrawn,
        }
    }
}

// =============================================================================
// IN-MEMORY WIRING
// =============================================================================

/// Sale wired to the in-memory adapters.
pub type InMemoryCrowdsale =
    CrowdsaleService<InMemoryPaymentLedger, InMemoryVestingRegistry, InMemoryEventBus>;

/// Builds a sale on fresh in-memory adapters, with the vesting pool funded
/// for the whole supply.
pub fn create_in_memory_service(
    sale: &SaleConfig,
    config: ServiceConfig,
) -> Result<InMemoryCrowdsale, ConfigError> {
    CrowdsaleService::new(
        sale,
        Arc::new(InMemoryPaymentLedger::new()),
        Arc::new(InMemoryVestingRegistry::with_funding(sale.supply_for_sale())),
        Arc::new(InMemoryEventBus::new()),
        config,
    )
}

/// Builds a default-priced in-memory sale for `operator` at `sale_address`.
pub fn create_test_service(
    operator: Address,
    sale_address: Address,
) -> Result<InMemoryCrowdsale, ConfigError> {
    create_in_memory_service(
        &SaleConfig::new(operator, sale_address),
        ServiceConfig::default(),
    )
}

// =============================================================================
// TESTS
// =============================================================================
