//! # Sale Session
//!
//! Owns the open sale tabs, the active-tab pointer, the selected section with
//! its price list, and the lookup sequencer.
//!
//! ## Invariants
//! - There is always at least one tab; closing the last one opens a fresh one.
//! - `active` always names a present tab.
//! - Cart, discount, customer and wallet edits go through
//!   [`SaleSession::mutate_active`] and are atomic: a failed edit leaves the
//!   tab exactly as it was.
//! - Tabs that are `Submitting` or `DebitPending` refuse edits and closing.
//!
//! ## Checkout Bookkeeping
//! ```text
//! begin_checkout ──► Submit(plan) ──► POST sales ──┬──► record_sale_submitted
//!       │                                          └──► fail_submission
//!       └──────────► RetryDebit(pending) ──► POST debit ─┬──► complete_debit
//!                                                        └──► record_debit_failed
//!                                                              └──► abandon_debit
//! ```

use crate::checkout::{
    plan_checkout, AfterSubmit, CheckoutStep, CompletedSale, PendingDebit, UnreconciledDebit,
};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::lookup::{LookupKind, LookupSequencer, LookupTicket};
use crate::pricing::{reprice_instance, PriceList, PriceResolution};
use crate::sale::{InstanceId, SaleInstance, SalePhase};
use crate::types::{Customer, PaymentMode, Product, ProductId, Section, SubmittedSale};

/// The selected section and its price list.
#[derive(Debug, Clone)]
pub struct SectionContext {
    pub section: Section,
    pub prices: PriceList,
}

/// Result of adding a product to the active tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedLine {
    pub index: usize,
    /// False when the section has no price for the product.
    pub price_configured: bool,
}

/// All open tabs of one register.
#[derive(Debug)]
pub struct SaleSession {
    instances: Vec<(InstanceId, SaleInstance)>,
    active: InstanceId,
    next_id: u64,
    section: Option<SectionContext>,
    lookups: LookupSequencer,
    unreconciled: Vec<UnreconciledDebit>,
}

impl Default for SaleSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SaleSession {
    /// Starts a session with one empty tab.
    pub fn new() -> Self {
        let first = InstanceId::from_raw(1);
        SaleSession {
            instances: vec![(first, SaleInstance::new())],
            active: first,
            next_id: 2,
            section: None,
            lookups: LookupSequencer::new(),
            unreconciled: Vec::new(),
        }
    }

    // =========================================================================
    // Tabs
    // =========================================================================

    pub fn instance_ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|(id, _)| *id).collect()
    }

    pub fn instances(&self) -> impl Iterator<Item = (InstanceId, &SaleInstance)> {
        self.instances.iter().map(|(id, sale)| (*id, sale))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn active_id(&self) -> InstanceId {
        self.active
    }

    pub fn active(&self) -> &SaleInstance {
        // `active` always names a present tab.
        self.position(self.active)
            .map(|i| &self.instances[i].1)
            .unwrap_or(&self.instances[0].1)
    }

    pub fn get(&self, id: InstanceId) -> CoreResult<&SaleInstance> {
        self.position(id)
            .map(|i| &self.instances[i].1)
            .ok_or(CoreError::InstanceNotFound(id))
    }

    fn get_mut(&mut self, id: InstanceId) -> CoreResult<&mut SaleInstance> {
        match self.position(id) {
            Some(i) => Ok(&mut self.instances[i].1),
            None => Err(CoreError::InstanceNotFound(id)),
        }
    }

    fn position(&self, id: InstanceId) -> Option<usize> {
        self.instances.iter().position(|(iid, _)| *iid == id)
    }

    /// Appends an empty tab and makes it active.
    pub fn create_instance(&mut self) -> InstanceId {
        let id = self.push_empty();
        self.active = id;
        id
    }

    fn push_empty(&mut self) -> InstanceId {
        let id = InstanceId::from_raw(self.next_id);
        self.next_id += 1;
        self.instances.push((id, SaleInstance::new()));
        id
    }

    /// Closes a tab that is not mid-checkout.
    pub fn close_instance(&mut self, id: InstanceId) -> CoreResult<()> {
        let sale = self.get(id)?;
        if !sale.is_editable() {
            return Err(CoreError::InstanceBusy {
                id,
                state: sale.state(),
            });
        }
        self.retire(id);
        Ok(())
    }

    /// Removes a tab unconditionally and repairs the active pointer.
    fn retire(&mut self, id: InstanceId) -> Option<SaleInstance> {
        let index = self.position(id)?;
        let (_, sale) = self.instances.remove(index);
        if self.instances.is_empty() {
            self.push_empty();
        }
        if self.active == id {
            self.active = self.instances[0].0;
        }
        Some(sale)
    }

    pub fn set_active(&mut self, id: InstanceId) -> CoreResult<()> {
        self.get(id)?;
        self.active = id;
        Ok(())
    }

    /// Applies `f` to the active tab.
    ///
    /// `f` runs on a copy which replaces the tab only if `f` succeeds.
    pub fn mutate_active<F, R>(&mut self, f: F) -> CoreResult<R>
    where
        F: FnOnce(&mut SaleInstance) -> CoreResult<R>,
    {
        let id = self.active;
        let sale = self.get_mut(id)?;
        if !sale.is_editable() {
            return Err(CoreError::InstanceBusy {
                id,
                state: sale.state(),
            });
        }
        let mut draft = sale.clone();
        let result = f(&mut draft)?;
        *sale = draft;
        Ok(result)
    }

    // =========================================================================
    // Section & Pricing
    // =========================================================================

    pub fn section(&self) -> Option<&Section> {
        self.section.as_ref().map(|ctx| &ctx.section)
    }

    pub fn price_list(&self) -> Option<&PriceList> {
        self.section.as_ref().map(|ctx| &ctx.prices)
    }

    /// Installs a new section context and re-prices the active tab.
    ///
    /// Other tabs keep their prices. A busy active tab is not re-priced.
    ///
    /// ## Returns
    /// Products in the active tab that have no price in the new list.
    pub fn select_section(&mut self, section: Section, prices: PriceList) -> CoreResult<Vec<ProductId>> {
        let active = self.active;
        let sale = self.get_mut(active)?;
        let unpriced = if sale.is_editable() {
            let repriced = reprice_instance(sale, &prices)?;
            *sale = repriced.instance;
            repriced.unpriced
        } else {
            Vec::new()
        };
        self.section = Some(SectionContext { section, prices });
        Ok(unpriced)
    }

    /// Resolves a product's price in the selected section.
    pub fn resolve_price(&self, product: ProductId) -> Option<PriceResolution> {
        self.price_list().map(|prices| prices.resolve(product))
    }

    /// Adds `product` to the active tab at the selected section's price.
    ///
    /// ## Errors
    /// `NoSectionSelected` when no section has been chosen yet.
    pub fn add_product(&mut self, product: &Product) -> CoreResult<AddedLine> {
        let ctx = self
            .section
            .as_ref()
            .ok_or(ValidationError::NoSectionSelected)?;
        let price = ctx.prices.resolve(product.id);
        let location = ctx.section.location;

        let index = self.mutate_active(|sale| sale.add_product(product, price, location))?;
        Ok(AddedLine {
            index,
            price_configured: price.is_configured(),
        })
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Issues a lookup ticket targeting the active tab.
    pub fn issue_lookup(&mut self, kind: LookupKind) -> LookupTicket {
        self.lookups.issue(kind, self.active)
    }

    /// Whether the response to `ticket` may still be applied.
    ///
    /// The ticket must be the latest of its kind and its tab must still be
    /// the editable active tab.
    pub fn accepts(&self, ticket: &LookupTicket) -> bool {
        self.lookups.is_current(ticket) && self.targets(ticket.instance)
    }

    /// Whether `id` still exists, is active and is editable.
    ///
    /// A response meant for a tab that was closed or switched away from in
    /// the meantime must not land in whichever tab is active now.
    pub fn targets(&self, id: InstanceId) -> bool {
        id == self.active && self.get(id).map(SaleInstance::is_editable).unwrap_or(false)
    }

    /// Installs a section fetched for `ticket` unless a later selection was
    /// issued meanwhile.
    ///
    /// The section is global, so a tab switch does not void the selection;
    /// whichever tab is active when it lands is re-priced.
    ///
    /// ## Returns
    /// `None` for a superseded selection, else the unpriced products.
    pub fn apply_section(
        &mut self,
        ticket: &LookupTicket,
        section: Section,
        prices: PriceList,
    ) -> CoreResult<Option<Vec<ProductId>>> {
        if ticket.kind != LookupKind::SectionSelect || !self.lookups.is_current(ticket) {
            return Ok(None);
        }
        self.select_section(section, prices).map(Some)
    }

    /// Applies an exact mobile match.
    ///
    /// ## Returns
    /// `true` if the customer was attached; `false` when the response is stale
    /// or there was no match.
    pub fn apply_mobile_match(&mut self, ticket: &LookupTicket, matched: Option<Customer>) -> bool {
        if !self.accepts(ticket) {
            return false;
        }
        let Some(customer) = matched else {
            return false;
        };
        self.mutate_active(|sale| {
            sale.attach_customer(customer);
            Ok(())
        })
        .is_ok()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Starts or resumes checkout of `id`.
    ///
    /// A `Building` tab is validated and moved to `Submitting`. A tab whose
    /// wallet debit failed earlier gets its debit retried without resubmitting
    /// the sale.
    pub fn begin_checkout(&mut self, id: InstanceId, mode: PaymentMode) -> CoreResult<CheckoutStep> {
        let section = self.section.as_ref().map(|ctx| ctx.section.clone());
        let sale = self.get_mut(id)?;
        let state = sale.state();

        let retry = match sale.phase() {
            SalePhase::Building => None,
            SalePhase::DebitPending { debit, in_flight: false } => Some(debit.clone()),
            _ => return Err(CoreError::InstanceBusy { id, state }),
        };

        match retry {
            None => {
                let plan = plan_checkout(id, sale, section.as_ref(), mode)?;
                sale.set_phase(SalePhase::Submitting(Box::new(plan.clone())));
                Ok(CheckoutStep::Submit(plan))
            }
            Some(debit) => {
                sale.set_phase(SalePhase::DebitPending {
                    debit: debit.clone(),
                    in_flight: true,
                });
                Ok(CheckoutStep::RetryDebit(*debit))
            }
        }
    }

    /// Returns a tab whose `POST sales` failed to `Building`, unchanged.
    pub fn fail_submission(&mut self, id: InstanceId) -> CoreResult<()> {
        let sale = self.get_mut(id)?;
        if matches!(sale.phase(), SalePhase::Submitting(_)) {
            sale.set_phase(SalePhase::Building);
        }
        Ok(())
    }

    /// Records the sale created by the backend for a submitting tab.
    ///
    /// Without a wallet deduction the tab is retired at once. Otherwise it
    /// moves to `DebitPending` with the debit marked in flight.
    pub fn record_sale_submitted(&mut self, id: InstanceId, created: SubmittedSale) -> CoreResult<AfterSubmit> {
        let sale = self.get_mut(id)?;
        let plan = match sale.phase() {
            SalePhase::Submitting(plan) => (**plan).clone(),
            _ => {
                return Err(CoreError::InstanceBusy {
                    id,
                    state: sale.state(),
                })
            }
        };

        match plan.wallet_debit {
            Some(debit) => {
                let pending = PendingDebit {
                    debit,
                    sale: created,
                    plan,
                };
                sale.set_phase(SalePhase::DebitPending {
                    debit: Box::new(pending.clone()),
                    in_flight: true,
                });
                Ok(AfterSubmit::DebitRequired(pending))
            }
            None => {
                self.retire(id);
                Ok(AfterSubmit::Completed(CompletedSale {
                    plan,
                    sale: created,
                    wallet_settled: true,
                }))
            }
        }
    }

    /// Keeps the tab in `DebitPending` after a failed debit so it can be
    /// retried or abandoned.
    pub fn record_debit_failed(&mut self, id: InstanceId) -> CoreResult<()> {
        let pending = self.pending_debit(id)?;
        let sale = self.get_mut(id)?;
        sale.set_phase(SalePhase::DebitPending {
            debit: Box::new(pending),
            in_flight: false,
        });
        Ok(())
    }

    /// Retires a tab whose wallet debit went through.
    pub fn complete_debit(&mut self, id: InstanceId) -> CoreResult<CompletedSale> {
        let pending = self.pending_debit(id)?;
        self.retire(id);
        Ok(CompletedSale {
            plan: pending.plan,
            sale: pending.sale,
            wallet_settled: true,
        })
    }

    /// Gives up on an outstanding debit, records it for manual follow-up and
    /// retires the tab.
    pub fn abandon_debit(&mut self, id: InstanceId) -> CoreResult<(CompletedSale, UnreconciledDebit)> {
        let sale = self.get(id)?;
        if let SalePhase::DebitPending { in_flight: true, .. } = sale.phase() {
            return Err(CoreError::InstanceBusy {
                id,
                state: sale.state(),
            });
        }
        let pending = self.pending_debit(id)?;
        let record = UnreconciledDebit::from(&pending);
        self.unreconciled.push(record.clone());
        self.retire(id);
        Ok((
            CompletedSale {
                plan: pending.plan,
                sale: pending.sale,
                wallet_settled: false,
            },
            record,
        ))
    }

    fn pending_debit(&self, id: InstanceId) -> CoreResult<PendingDebit> {
        match self.get(id)?.phase() {
            SalePhase::DebitPending { debit, .. } => Ok((**debit).clone()),
            _ => Err(CoreError::NoPendingDebit(id)),
        }
    }

    /// Debits abandoned during this session.
    pub fn unreconciled(&self) -> &[UnreconciledDebit] {
        &self.unreconciled
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_product;
    use crate::checkout::tests::test_section;
    use crate::money::Money;
    use crate::sale::tests::customer_with_wallet;
    use crate::sale::SaleState;
    use crate::types::SectionPrice;

    fn prices(section: u64, rows: &[(u64, i64)]) -> PriceList {
        PriceList::from_rows(
            section,
            rows.iter().map(|(product, cents)| SectionPrice {
                id: None,
                section,
                product: *product,
                price: Money::from_cents(*cents),
                is_manual: false,
            }),
        )
    }

    fn created_sale(id: u64) -> SubmittedSale {
        SubmittedSale {
            id,
            invoice_number: format!("INV-{}", id),
            sale_datetime: None,
            customer_name: None,
            customer_mobile: None,
            payment_mode: None,
            discount: None,
            total_amount: None,
            created_by: None,
            items: Vec::new(),
        }
    }

    /// Session with section 1 selected and a 30.00 cart on the active tab.
    fn ready_session() -> SaleSession {
        let mut session = SaleSession::new();
        session
            .select_section(test_section(1), prices(1, &[(1, 1000)]))
            .unwrap();
        session.add_product(&test_product(1)).unwrap();
        session
            .mutate_active(|sale| {
                sale.set_quantity(0, 3)?;
                sale.customer_mobile_input("5550001");
                Ok(())
            })
            .unwrap();
        session
    }

    #[test]
    fn test_new_session_has_one_active_tab() {
        let session = SaleSession::new();
        assert_eq!(session.len(), 1);
        assert_eq!(session.active_id(), session.instance_ids()[0]);
        assert_eq!(session.active().state(), SaleState::Empty);
    }

    #[test]
    fn test_closing_last_tab_spawns_fresh_one() {
        let mut session = SaleSession::new();
        let only = session.active_id();
        session.close_instance(only).unwrap();

        assert_eq!(session.len(), 1);
        assert_ne!(session.active_id(), only);
        assert!(session.active().lines().is_empty());
    }

    #[test]
    fn test_closing_active_repoints_to_first() {
        let mut session = SaleSession::new();
        let first = session.active_id();
        let second = session.create_instance();
        let third = session.create_instance();
        assert_eq!(session.active_id(), third);

        session.close_instance(third).unwrap();
        assert_eq!(session.active_id(), first);

        session.set_active(second).unwrap();
        session.close_instance(first).unwrap();
        assert_eq!(session.active_id(), second);
    }

    #[test]
    fn test_set_active_unknown_tab() {
        let mut session = SaleSession::new();
        let missing = InstanceId::from_raw(99);
        assert!(matches!(session.set_active(missing), Err(CoreError::InstanceNotFound(id)) if id == missing));
    }

    #[test]
    fn test_mutate_active_is_atomic() {
        let mut session = ready_session();
        let result = session.mutate_active(|sale| {
            sale.set_discount(Money::from_cents(100))?;
            sale.set_quantity(0, 5000)?;
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(session.active().discount(), Money::zero());
        assert_eq!(session.active().lines()[0].quantity(), 3);
    }

    #[test]
    fn test_add_requires_section() {
        let mut session = SaleSession::new();
        assert!(matches!(
            session.add_product(&test_product(1)),
            Err(CoreError::Validation(ValidationError::NoSectionSelected))
        ));
    }

    #[test]
    fn test_scenario_d_same_product_twice() {
        let mut session = SaleSession::new();
        session.select_section(test_section(1), prices(1, &[(1, 500)])).unwrap();
        session.add_product(&test_product(1)).unwrap();
        session.add_product(&test_product(1)).unwrap();

        assert_eq!(session.active().lines().len(), 1);
        assert_eq!(session.active().lines()[0].quantity(), 2);
    }

    #[test]
    fn test_scenario_e_unpriced_product() {
        let mut session = SaleSession::new();
        session.select_section(test_section(1), prices(1, &[])).unwrap();

        let added = session.add_product(&test_product(8)).unwrap();
        assert!(!added.price_configured);
        assert_eq!(session.active().lines()[0].price(), Money::zero());

        session
            .mutate_active(|sale| sale.set_price(added.index, Money::from_cents(1250)))
            .unwrap();
        assert_eq!(session.active().lines()[0].total(), Money::from_cents(1250));
    }

    #[test]
    fn test_line_takes_section_location() {
        let session = ready_session();
        assert_eq!(session.active().lines()[0].location, Some(101));
    }

    #[test]
    fn test_section_change_reprices_active_only() {
        let mut session = ready_session();
        let first = session.active_id();

        let second = session.create_instance();
        session.add_product(&test_product(1)).unwrap();
        session.set_active(first).unwrap();

        let unpriced = session
            .select_section(test_section(2), prices(2, &[(1, 1500)]))
            .unwrap();
        assert!(unpriced.is_empty());

        let active = session.active();
        assert_eq!(active.lines()[0].quantity(), 3);
        assert_eq!(active.lines()[0].total(), Money::from_cents(4500));
        assert_eq!(session.get(second).unwrap().lines()[0].price(), Money::from_cents(1000));
    }

    #[test]
    fn test_section_change_reports_missing_prices() {
        let mut session = ready_session();
        let unpriced = session.select_section(test_section(2), prices(2, &[])).unwrap();
        assert_eq!(unpriced, vec![1]);
        assert_eq!(session.active().lines()[0].price(), Money::from_cents(1000));
    }

    #[test]
    fn test_stale_lookup_discarded() {
        let mut session = SaleSession::new();
        let customer = customer_with_wallet(3, "5550001", 2000);

        let old = session.issue_lookup(LookupKind::CustomerMobile);
        let new = session.issue_lookup(LookupKind::CustomerMobile);

        assert!(!session.apply_mobile_match(&old, Some(customer.clone())));
        assert!(session.active().customer().is_none());
        assert!(session.apply_mobile_match(&new, Some(customer)));
        assert_eq!(session.active().wallet_balance(), Money::from_cents(2000));
    }

    #[test]
    fn test_lookup_for_inactive_or_closed_tab_discarded() {
        let mut session = SaleSession::new();
        let ticket = session.issue_lookup(LookupKind::CustomerMobile);
        let target = ticket.instance;

        session.create_instance();
        assert!(!session.apply_mobile_match(&ticket, Some(customer_with_wallet(1, "555", 0))));

        session.close_instance(target).unwrap();
        assert!(!session.accepts(&ticket));
        assert!(session.active().customer().is_none());
    }

    #[test]
    fn test_targets_only_live_active_tab() {
        let mut session = SaleSession::new();
        let first = session.active_id();
        assert!(session.targets(first));

        let second = session.create_instance();
        assert!(!session.targets(first));

        session.close_instance(second).unwrap();
        assert!(!session.targets(second));
        assert!(session.targets(first));
    }

    #[test]
    fn test_only_latest_section_selection_applies() {
        let mut session = SaleSession::new();
        let older = session.issue_lookup(LookupKind::SectionSelect);
        let newer = session.issue_lookup(LookupKind::SectionSelect);

        let applied = session
            .apply_section(&newer, test_section(2), prices(2, &[]))
            .unwrap();
        assert_eq!(applied, Some(Vec::new()));

        let late = session
            .apply_section(&older, test_section(1), prices(1, &[]))
            .unwrap();
        assert_eq!(late, None);
        assert_eq!(session.section().map(|s| s.id), Some(2));
    }

    #[test]
    fn test_section_applies_after_tab_switch() {
        let mut session = SaleSession::new();
        let ticket = session.issue_lookup(LookupKind::SectionSelect);
        session.create_instance();

        let applied = session
            .apply_section(&ticket, test_section(1), prices(1, &[]))
            .unwrap();
        assert!(applied.is_some());
        assert_eq!(session.section().map(|s| s.id), Some(1));
    }

    #[test]
    fn test_no_match_leaves_tab_unchanged() {
        let mut session = SaleSession::new();
        let ticket = session.issue_lookup(LookupKind::CustomerMobile);
        assert!(!session.apply_mobile_match(&ticket, None));
        assert!(session.active().customer().is_none());
    }

    #[test]
    fn test_checkout_without_wallet_retires_tab() {
        let mut session = ready_session();
        let id = session.active_id();

        let CheckoutStep::Submit(plan) = session.begin_checkout(id, PaymentMode::Cash).unwrap() else {
            panic!("expected submit step");
        };
        assert_eq!(plan.summary.grand_total, Money::from_cents(3000));

        match session.record_sale_submitted(id, created_sale(9)).unwrap() {
            AfterSubmit::Completed(done) => assert_eq!(done.sale.invoice_number, "INV-9"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(session.get(id).is_err());
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_submitting_tab_refuses_edit_and_close() {
        let mut session = ready_session();
        let id = session.active_id();
        session.begin_checkout(id, PaymentMode::Cash).unwrap();

        let err = session.close_instance(id).unwrap_err();
        assert!(matches!(err, CoreError::InstanceBusy { state: SaleState::Submitting, .. }));
        assert!(session.mutate_active(|sale| sale.set_discount(Money::zero())).is_err());
        assert!(session.begin_checkout(id, PaymentMode::Cash).is_err());

        // Other tabs stay editable.
        session.create_instance();
        session.add_product(&test_product(1)).unwrap();
    }

    #[test]
    fn test_failed_submission_preserves_cart() {
        let mut session = ready_session();
        let id = session.active_id();
        session.begin_checkout(id, PaymentMode::Cash).unwrap();
        session.fail_submission(id).unwrap();

        let sale = session.get(id).unwrap();
        assert_eq!(sale.state(), SaleState::Building);
        assert_eq!(sale.lines()[0].quantity(), 3);
    }

    #[test]
    fn test_validation_error_leaves_building() {
        let mut session = SaleSession::new();
        let id = session.active_id();
        let err = session.begin_checkout(id, PaymentMode::Cash).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::NoSectionSelected)));
        assert!(session.get(id).unwrap().is_editable());
    }

    #[test]
    fn test_wallet_debit_failure_then_retry() {
        let mut session = ready_session();
        let id = session.active_id();
        session
            .mutate_active(|sale| {
                sale.attach_customer(customer_with_wallet(7, "5550001", 5000));
                sale.set_wallet_deduction(Money::from_cents(3000))?;
                Ok(())
            })
            .unwrap();

        session.begin_checkout(id, PaymentMode::Cash).unwrap();
        let AfterSubmit::DebitRequired(pending) = session.record_sale_submitted(id, created_sale(11)).unwrap() else {
            panic!("expected debit step");
        };
        assert_eq!(pending.debit.amount, Money::from_cents(3000));
        assert_eq!(pending.note(), "Payment for Invoice #INV-11");

        // Debit fails: tab kept, closing refused.
        session.record_debit_failed(id).unwrap();
        assert_eq!(session.get(id).unwrap().state(), SaleState::DebitPending);
        assert!(session.close_instance(id).is_err());

        // Next checkout retries only the debit.
        match session.begin_checkout(id, PaymentMode::Cash).unwrap() {
            CheckoutStep::RetryDebit(retry) => assert_eq!(retry.sale.id, 11),
            CheckoutStep::Submit(_) => panic!("sale must not be resubmitted"),
        }
        let done = session.complete_debit(id).unwrap();
        assert!(done.wallet_settled);
        assert!(session.get(id).is_err());
    }

    #[test]
    fn test_abandon_debit_records_unreconciled() {
        let mut session = ready_session();
        let id = session.active_id();
        session
            .mutate_active(|sale| {
                sale.attach_customer(customer_with_wallet(7, "5550001", 1000));
                sale.set_wallet_deduction(Money::from_cents(1000))?;
                Ok(())
            })
            .unwrap();
        session.begin_checkout(id, PaymentMode::Cash).unwrap();
        session.record_sale_submitted(id, created_sale(12)).unwrap();

        // Debit still in flight.
        assert!(session.abandon_debit(id).is_err());

        session.record_debit_failed(id).unwrap();
        let (done, record) = session.abandon_debit(id).unwrap();
        assert!(!done.wallet_settled);
        assert_eq!(record.invoice_number, "INV-12");
        assert_eq!(record.amount, Money::from_cents(1000));
        assert_eq!(session.unreconciled(), &[record]);
        assert!(session.get(id).is_err());
    }

    #[test]
    fn test_abandon_without_pending_debit() {
        let mut session = ready_session();
        let id = session.active_id();
        assert!(matches!(session.abandon_debit(id), Err(CoreError::NoPendingDebit(_))));
    }
}
