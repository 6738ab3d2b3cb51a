use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tracing::{debug, info};

use evl_gate::{ApprovalRegistry, RoleRegistry, TransferPolicy};
use evl_ledger::{BalanceReader, BalanceWriter, DebitPlan, InMemoryLedger};
use evl_types::{AccountId, ClassId, DayClock, Role, SystemClock};

use crate::config::TokenConfig;
use crate::error::{TokenError, TokenResult};
use crate::receiver::{ReceivedTransfer, ReceiverAck, TransferReceiver};

/// Multi-class expiring token.
///
/// Composes the class ledger, the role and approval registries, and a
/// day clock. Construction is the one-time initializer: it fixes the
/// expiration period, starts supply at zero, and grants the initial
/// admin the `Admin` and `Minter` roles. Every transfer variant routes
/// through the ledger's single debit/credit primitive, so the
/// oldest-first and atomicity invariants cannot diverge between paths.
pub struct ExpiringToken {
    config: TokenConfig,
    ledger: InMemoryLedger,
    roles: RoleRegistry,
    approvals: ApprovalRegistry,
    clock: Arc<dyn DayClock>,
    receivers: RwLock<HashMap<AccountId, Arc<dyn TransferReceiver>>>,
}

impl ExpiringToken {
    /// Initialize a token on the system clock.
    pub fn new(config: TokenConfig, admin: AccountId) -> Self {
        Self::with_clock(config, admin, Arc::new(SystemClock::new()))
    }

    /// Initialize a token on an explicit clock (tests, simulation).
    pub fn with_clock(config: TokenConfig, admin: AccountId, clock: Arc<dyn DayClock>) -> Self {
        info!(
            name = %config.name,
            symbol = %config.symbol,
            period_days = config.expiration_period_days,
            "token initialized"
        );
        Self {
            config,
            ledger: InMemoryLedger::new(),
            roles: RoleRegistry::bootstrap(admin),
            approvals: ApprovalRegistry::new(),
            clock,
            receivers: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// The current day according to this token's clock.
    pub fn today(&self) -> ClassId {
        self.clock.today()
    }

    fn period(&self) -> u64 {
        self.config.expiration_period_days
    }

    fn policy(&self) -> TransferPolicy<'_> {
        TransferPolicy::new(&self.roles, &self.approvals)
    }

    // ---- Minting ----

    /// Create `quantity` new units in `to`'s current-day class. The
    /// caller must hold `Minter`. Returns the new entry value for that
    /// class.
    pub fn mint(&self, caller: AccountId, to: AccountId, quantity: u128) -> TokenResult<u128> {
        self.roles.require_role(caller, Role::Minter)?;
        let today = self.clock.today();
        let entry = self.ledger.mint(to, quantity, today)?;
        info!(%caller, %to, quantity, class = %today, "minted");
        Ok(entry)
    }

    // ---- Balance queries (computed against the clock on every call) ----

    /// Sum of the holder's non-expired classes.
    pub fn balance_of(&self, holder: AccountId) -> u128 {
        self.ledger
            .live_balance(holder, self.clock.today(), self.period())
    }

    /// Sum of the holder's expired classes. Still counts toward total
    /// supply; expiry is a visibility rule, not a destruction event.
    pub fn expired_token_balance(&self, holder: AccountId) -> u128 {
        self.ledger
            .expired_balance(holder, self.clock.today(), self.period())
    }

    /// The raw entry for one (holder, class) pair, live or not.
    pub fn class_balance(&self, holder: AccountId, class: ClassId) -> u128 {
        self.ledger.class_balance(holder, class)
    }

    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Whether `class` is expired as of the current clock reading.
    pub fn is_expired(&self, class: ClassId) -> bool {
        class.is_expired(self.clock.today(), self.period())
    }

    /// Number of classes the holder has ever touched (never shrinks).
    pub fn user_num_token_classes(&self, holder: AccountId) -> usize {
        self.ledger.class_count(holder)
    }

    /// The holder's `index`-th class in first-touch order.
    pub fn user_token_classes(&self, holder: AccountId, index: usize) -> TokenResult<ClassId> {
        Ok(self.ledger.class_at(holder, index)?)
    }

    // ---- Roles ----

    pub fn grant_role(&self, caller: AccountId, account: AccountId, role: Role) -> TokenResult<()> {
        Ok(self.roles.grant(caller, account, role)?)
    }

    pub fn revoke_role(
        &self,
        caller: AccountId,
        account: AccountId,
        role: Role,
    ) -> TokenResult<()> {
        Ok(self.roles.revoke(caller, account, role)?)
    }

    pub fn has_role(&self, account: AccountId, role: Role) -> bool {
        self.roles.has_role(account, role)
    }

    // ---- Approvals ----

    pub fn set_approval_for_all(
        &self,
        caller: AccountId,
        operator: AccountId,
        approved: bool,
    ) -> TokenResult<()> {
        Ok(self
            .approvals
            .set_approval_for_all(caller, operator, approved)?)
    }

    pub fn is_approved_for_all(&self, owner: AccountId, operator: AccountId) -> bool {
        self.approvals.is_approved_for_all(owner, operator)
    }

    // ---- Receivers ----

    /// Register a reactive recipient. At most one receiver per account;
    /// a second registration replaces the first.
    pub fn register_receiver(&self, account: AccountId, receiver: Arc<dyn TransferReceiver>) {
        self.receivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account, receiver);
    }

    pub fn unregister_receiver(&self, account: AccountId) {
        self.receivers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&account);
    }

    fn receiver_for(&self, account: AccountId) -> Option<Arc<dyn TransferReceiver>> {
        self.receivers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&account)
            .cloned()
    }

    // ---- Transfers ----

    /// Move `quantity` of `from`'s live value to `to`, debiting the
    /// oldest live classes first and crediting `to`'s current-day class
    /// (the expiration clock restarts on transfer).
    pub fn safe_transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        quantity: u128,
    ) -> TokenResult<()> {
        let policy = self.policy();
        policy.authorize_spender(caller, from)?;
        policy.authorize_recipient(caller, from, to)?;

        let today = self.clock.today();
        let plan = self
            .ledger
            .transfer_live(from, to, quantity, today, self.period())?;
        debug!(%caller, %from, %to, quantity, "transfer committed");
        self.settle(caller, from, to, &plan, today)
    }

    /// As [`Self::safe_transfer_from`], but debits exactly `class`;
    /// fails if that class lacks sufficient live value regardless of
    /// the holder's aggregate balance. The credit still lands in `to`'s
    /// current-day class.
    pub fn safe_transfer_class_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        class: ClassId,
        quantity: u128,
    ) -> TokenResult<()> {
        self.safe_batch_transfer_from(caller, from, to, &[class], &[quantity])
    }

    /// Apply one per-class transfer for each (class, quantity) pair,
    /// atomically as a whole: any single pair's failure aborts the
    /// entire batch with no partial effects. The recipient's receiver
    /// observes one notification per pair, in input order, all with the
    /// same commit timestamp.
    pub fn safe_batch_transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        classes: &[ClassId],
        quantities: &[u128],
    ) -> TokenResult<()> {
        if classes.len() != quantities.len() {
            return Err(TokenError::BatchLengthMismatch {
                classes: classes.len(),
                quantities: quantities.len(),
            });
        }
        let policy = self.policy();
        policy.authorize_spender(caller, from)?;
        policy.authorize_recipient(caller, from, to)?;

        let pairs: Vec<(ClassId, u128)> = classes
            .iter()
            .copied()
            .zip(quantities.iter().copied())
            .collect();
        let today = self.clock.today();
        let plan = self
            .ledger
            .transfer_classes(from, to, &pairs, today, self.period())?;
        debug!(%caller, %from, %to, pairs = pairs.len(), "batch transfer committed");
        self.settle(caller, from, to, &plan, today)
    }

    // ---- ERC20-style veneer ----

    /// Sender-initiated single-balance transfer.
    pub fn transfer(&self, caller: AccountId, to: AccountId, quantity: u128) -> TokenResult<()> {
        self.safe_transfer_from(caller, caller, to, quantity)
    }

    /// Set the scalar allowance for (caller, spender).
    pub fn approve(
        &self,
        caller: AccountId,
        spender: AccountId,
        quantity: u128,
    ) -> TokenResult<()> {
        Ok(self.approvals.approve(caller, spender, quantity)?)
    }

    pub fn allowance(&self, owner: AccountId, spender: AccountId) -> u128 {
        self.approvals.allowance(owner, spender)
    }

    /// Allowance-gated delegated transfer. The allowance is an
    /// additional gate, not a substitute: the whitelist check and the
    /// oldest-first debit path are identical to the multi-class
    /// transfers.
    pub fn transfer_from(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        quantity: u128,
    ) -> TokenResult<()> {
        self.policy().authorize_recipient(caller, from, to)?;
        // Check-and-decrement under one lock; refunded if the transfer
        // itself cannot complete, so a failed call fully unwinds.
        self.approvals.spend_allowance(from, caller, quantity)?;

        let today = self.clock.today();
        let plan = match self
            .ledger
            .transfer_live(from, to, quantity, today, self.period())
        {
            Ok(plan) => plan,
            Err(e) => {
                self.approvals.refund_allowance(from, caller, quantity)?;
                return Err(e.into());
            }
        };
        debug!(%caller, %from, %to, quantity, "delegated transfer committed");
        match self.settle(caller, from, to, &plan, today) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.approvals.refund_allowance(from, caller, quantity)?;
                Err(e)
            }
        }
    }

    // ---- Settlement ----

    /// Notify the recipient's receiver, if any, strictly after the
    /// ledger mutations for this operation are finalized and the lock
    /// released. A refusal reverses the committed transfer exactly, as
    /// its own indivisible operation, and fails the enclosing call.
    fn settle(
        &self,
        caller: AccountId,
        from: AccountId,
        to: AccountId,
        plan: &DebitPlan,
        today: ClassId,
    ) -> TokenResult<()> {
        let Some(receiver) = self.receiver_for(to) else {
            return Ok(());
        };
        let at = Utc::now();
        for &(class, quantity) in plan.debits() {
            let notice = ReceivedTransfer {
                operator: caller,
                from,
                class,
                quantity,
                at,
            };
            if receiver.on_received(&notice) == ReceiverAck::Rejected {
                self.ledger.reverse_transfer(from, to, plan, today)?;
                debug!(%from, %to, "transfer refused by receiver; reversed");
                return Err(TokenError::TransferRefused { recipient: to });
            }
        }
        Ok(())
    }
}
