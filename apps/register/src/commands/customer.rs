//! # Customer Commands
//!
//! Two debounced lookups feed the customer fields of the active tab:
//!
//! | Input  | Settle | Backend call                    | Applies                     |
//! |--------|--------|---------------------------------|-----------------------------|
//! | name   | 300 ms | search, limit 50                | returns suggestions         |
//! | mobile | 400 ms | search, limit 1, exact equality | attaches the match          |
//!
//! Mobile inputs shorter than three characters are not looked up. A result
//! is dropped when a newer input of the same kind arrived, or the tab it was
//! meant for was closed, switched away from or went into checkout.

use serde::Serialize;
use tracing::{debug, info};

use mueen_api::exact_mobile_match;
use mueen_core::validation::{validate_mobile_query, validate_search_query};
use mueen_core::{Customer, LookupKind};

use crate::commands::{settle, still_current, Lookup, SaleView};
use crate::error::ApiError;
use crate::state::{BackendState, ConfigState, SessionState};

/// Result of an exact mobile lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileMatch {
    /// False when no customer has this exact mobile; the tab is unchanged.
    pub matched: bool,
    pub tab: SaleView,
}

/// Free text typed into the name field.
///
/// Detaches any attached customer at once, then returns suggestions after
/// the settle window.
pub async fn customer_name_input(
    session: &SessionState,
    backend: &BackendState,
    config: &ConfigState,
    text: &str,
) -> Result<Lookup<Vec<Customer>>, ApiError> {
    let ticket = session.with_session_mut(|s| {
        s.mutate_active(|sale| {
            sale.customer_name_input(text);
            Ok(())
        })?;
        Ok(s.issue_lookup(LookupKind::CustomerName))
    })?;

    let query = validate_search_query(text)?;
    if query.is_empty() {
        return Ok(Lookup::Skipped);
    }

    if !settle(session, &ticket, config.name_debounce()).await? {
        return Ok(Lookup::Superseded);
    }

    debug!(query = %query, "customer name lookup");
    let result = backend
        .inner()
        .search_customers(&query, config.customer_search_limit)
        .await;

    if !still_current(session, &ticket)? {
        return Ok(Lookup::Superseded);
    }
    Ok(Lookup::Ready(result?))
}

/// Text typed into the mobile field.
///
/// After the settle window an exact mobile match attaches the customer
/// (name, mobile, wallet), overriding free text.
pub async fn customer_mobile_input(
    session: &SessionState,
    backend: &BackendState,
    config: &ConfigState,
    text: &str,
) -> Result<Lookup<MobileMatch>, ApiError> {
    let ticket = session.with_session_mut(|s| {
        s.mutate_active(|sale| {
            sale.customer_mobile_input(text);
            Ok(())
        })?;
        Ok(s.issue_lookup(LookupKind::CustomerMobile))
    })?;

    let Some(mobile) = validate_mobile_query(text) else {
        return Ok(Lookup::Skipped);
    };

    if !settle(session, &ticket, config.mobile_debounce()).await? {
        return Ok(Lookup::Superseded);
    }

    debug!(mobile = %mobile, "customer mobile lookup");
    let result = backend.inner().search_customers(&mobile, 1).await;

    let candidates = match result {
        Ok(candidates) => candidates,
        Err(e) => {
            if !still_current(session, &ticket)? {
                return Ok(Lookup::Superseded);
            }
            return Err(e.into());
        }
    };
    let matched = exact_mobile_match(candidates, &mobile);

    let outcome = session.with_session_mut(|s| {
        if !s.accepts(&ticket) {
            return Ok(None);
        }
        let attached = s.apply_mobile_match(&ticket, matched);
        Ok(Some(MobileMatch {
            matched: attached,
            tab: SaleView::active(s, config.default_payment_mode),
        }))
    })?;

    match outcome {
        Some(found) => {
            if found.matched {
                info!(tab = %found.tab.id, customer_id = ?found.tab.customer_id, "Customer attached by mobile");
            }
            Ok(Lookup::Ready(found))
        }
        None => Ok(Lookup::Superseded),
    }
}

/// Attaches a customer picked from the suggestions.
pub fn select_customer(session: &SessionState, config: &ConfigState, customer: Customer) -> Result<SaleView, ApiError> {
    debug!(customer_id = customer.id, "select_customer command");
    session.with_session_mut(|s| {
        s.mutate_active(|sale| {
            sale.attach_customer(customer);
            Ok(())
        })?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}

/// Keeps the typed name as an unregistered walk-in customer.
pub fn select_walk_in(session: &SessionState, config: &ConfigState) -> Result<SaleView, ApiError> {
    debug!("select_walk_in command");
    session.with_session_mut(|s| {
        s.mutate_active(|sale| {
            sale.select_walk_in();
            Ok(())
        })?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}

/// Clears name, mobile and the attached customer.
pub fn clear_customer(session: &SessionState, config: &ConfigState) -> Result<SaleView, ApiError> {
    debug!("clear_customer command");
    session.with_session_mut(|s| {
        s.mutate_active(|sale| {
            sale.clear_customer();
            Ok(())
        })?;
        Ok(SaleView::active(s, config.default_payment_mode))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tabs::{get_active_tab, new_tab, switch_tab};
    use crate::testing::{customer, FakeBackend, Harness};
    use mueen_core::{InstanceId, Money, WALK_IN_CUSTOMER_ID};
    use std::time::Duration;

    fn backend() -> FakeBackend {
        FakeBackend::new()
            .with_customer(customer(5, "Aisha", "5550001", 5000))
            .with_customer(customer(6, "Aisha B", "5550002", 0))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_mobile_typing_only_latest_applies() {
        let h = Harness::new(backend());

        let (first, second) = tokio::join!(
            customer_mobile_input(&h.session, &h.backend, &h.config, "555"),
            customer_mobile_input(&h.session, &h.backend, &h.config, "5550001"),
        );

        assert!(first.unwrap().is_superseded());
        let found = second.unwrap().ready().unwrap();
        assert!(found.matched);
        assert_eq!(found.tab.customer_name, "Aisha");
        assert_eq!(found.tab.customer_id, Some(5));
        assert!(found.tab.use_wallet);

        // The superseded input never reached the backend.
        assert_eq!(*h.fake.customer_queries.lock().unwrap(), vec!["5550001".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_for_inactive_tab_is_discarded() {
        let h = Harness::new(backend().with_customer_delay(Duration::from_millis(200)));

        let switch_away = async {
            // Past the 400 ms settle window, before the 200 ms backend delay ends.
            tokio::time::sleep(Duration::from_millis(500)).await;
            new_tab(&h.session, &h.config).unwrap();
        };
        let (lookup, _) = tokio::join!(
            customer_mobile_input(&h.session, &h.backend, &h.config, "5550001"),
            switch_away,
        );
        assert!(lookup.unwrap().is_superseded());

        let first = switch_tab(&h.session, &h.config, InstanceId::from_raw(1)).unwrap();
        assert_eq!(first.customer_id, None);
        assert_eq!(first.customer_mobile, "5550001");
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_mobile_is_not_looked_up() {
        let h = Harness::new(backend());
        let outcome = customer_mobile_input(&h.session, &h.backend, &h.config, "55").await.unwrap();
        assert!(matches!(outcome, Lookup::Skipped));
        assert!(h.fake.customer_queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_exact_match_leaves_tab_unchanged() {
        let h = Harness::new(backend());
        let found = customer_mobile_input(&h.session, &h.backend, &h.config, "555000")
            .await
            .unwrap()
            .ready()
            .unwrap();
        assert!(!found.matched);
        assert_eq!(found.tab.customer_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_name_input_detaches_and_suggests() {
        let h = Harness::new(backend());
        select_customer(&h.session, &h.config, customer(5, "Aisha", "5550001", 5000)).unwrap();

        let suggestions = customer_name_input(&h.session, &h.backend, &h.config, "aisha")
            .await
            .unwrap()
            .ready()
            .unwrap();
        assert_eq!(suggestions.len(), 2);

        let tab = get_active_tab(&h.session, &h.config).unwrap();
        assert_eq!(tab.customer_id, None);
        assert!(!tab.use_wallet);
        assert_eq!(tab.summary.wallet_deduction, Money::zero());
    }

    #[tokio::test]
    async fn test_walk_in_and_clear() {
        let h = Harness::new(backend());
        customer_name_input(&h.session, &h.backend, &h.config, "").await.unwrap();

        let view = h
            .session
            .with_session_mut(|s| {
                s.mutate_active(|sale| {
                    sale.customer_name_input("Guest");
                    sale.customer_mobile_input("777");
                    Ok(())
                })
            })
            .and_then(|_| select_walk_in(&h.session, &h.config))
            .unwrap();
        assert_eq!(view.customer_id, Some(WALK_IN_CUSTOMER_ID));
        assert_eq!(view.customer_name, "Guest");
        assert!(!view.use_wallet);

        let cleared = clear_customer(&h.session, &h.config).unwrap();
        assert_eq!(cleared.customer_name, "");
        assert_eq!(cleared.customer_mobile, "");
        assert_eq!(cleared.customer_id, None);
    }
}
