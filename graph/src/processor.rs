//! Applying quote events to the registry and rate store.

use bestrate_common::{QuoteUpdate, Timestamp, VertexId};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{GraphError, GraphResult};
use crate::registry::VertexIndex;
use crate::state::GraphState;

/// What a quote did to the stored rate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOutcome {
    /// First quote for the pair; both directions installed.
    Inserted,
    /// Strictly newer than the stored pair; both directions replaced.
    Updated,
    /// Not newer than the stored pair; nothing written.
    Discarded,
}

impl UpdateOutcome {
    /// Whether the store changed.
    pub fn is_applied(&self) -> bool {
        !matches!(self, UpdateOutcome::Discarded)
    }
}

/// Result of applying one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Effect on the quoted pair.
    pub outcome: UpdateOutcome,
    /// Vertices first seen in this quote, in registration order.
    pub registered: Vec<VertexId>,
}

impl GraphState {
    /// Apply a validated quote.
    ///
    /// Forward and backward rates are decided together: both are written
    /// when the pair is new or the quote is strictly newer than the stored
    /// observation, otherwise neither is.
    pub fn apply_quote(&mut self, quote: &QuoteUpdate) -> GraphResult<UpdateReport> {
        let mut registered = Vec::new();
        let source = self.register(quote.source_vertex(), quote.timestamp, &mut registered)?;
        let destination =
            self.register(quote.destination_vertex(), quote.timestamp, &mut registered)?;

        let outcome = self.decide(source, destination, quote.timestamp)?;
        if outcome.is_applied() {
            self.store
                .set_edge(source, destination, quote.forward_rate, quote.timestamp)?;
            self.store
                .set_edge(destination, source, quote.backward_rate, quote.timestamp)?;
            self.mark_stale();
        }

        debug!(quote = %quote, outcome = ?outcome, "Quote processed");
        Ok(UpdateReport {
            outcome,
            registered,
        })
    }

    fn register(
        &mut self,
        vertex: VertexId,
        at: Timestamp,
        registered: &mut Vec<VertexId>,
    ) -> GraphResult<VertexIndex> {
        let registration = self.registry.ensure(&vertex, &mut self.store, at)?;
        if registration.is_new {
            info!(vertex = %vertex, index = %registration.index, "Vertex registered");
            self.mark_stale();
            registered.push(vertex);
        }
        Ok(registration.index)
    }

    fn decide(
        &self,
        source: VertexIndex,
        destination: VertexIndex,
        observed_at: Timestamp,
    ) -> GraphResult<UpdateOutcome> {
        match (
            self.store.edge(source, destination),
            self.store.edge(destination, source),
        ) {
            (None, None) => Ok(UpdateOutcome::Inserted),
            (Some(forward), Some(_)) if observed_at > forward.observed_at => {
                Ok(UpdateOutcome::Updated)
            }
            (Some(_), Some(_)) => Ok(UpdateOutcome::Discarded),
            _ => Err(GraphError::invariant(format!(
                "rate pair {} <-> {} is stored in one direction only",
                source, destination
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::IDENTITY_RATE;
    use bestrate_common::parse_timestamp;
    use proptest::prelude::*;

    fn quote(ts: &str, ex: &str, src: &str, dst: &str, fwd: f64, bwd: f64) -> QuoteUpdate {
        QuoteUpdate::parse(ts, ex, src, dst, fwd, bwd).unwrap()
    }

    fn stored(state: &GraphState, from: &VertexId, to: &VertexId) -> Option<f64> {
        let from = state.registry().index_of(from)?;
        let to = state.registry().index_of(to)?;
        state.store().edge(from, to).map(|e| e.rate)
    }

    #[test]
    fn test_first_quote_inserts_both_directions() {
        let mut state = GraphState::new();
        let report = state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();

        let btc = VertexId::new("KRAKEN", "BTC");
        let usd = VertexId::new("KRAKEN", "USD");
        assert_eq!(report.outcome, UpdateOutcome::Inserted);
        assert_eq!(report.registered, vec![btc.clone(), usd.clone()]);
        assert_eq!(stored(&state, &btc, &usd), Some(1000.0));
        assert_eq!(stored(&state, &usd, &btc), Some(0.0009));
        assert!(state.is_stale());
    }

    #[test]
    fn test_newer_quote_replaces_both_directions() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        state.rebuild(10).unwrap();

        let report = state
            .apply_quote(&quote("2017-11-01T09:43:23+00:00", "KRAKEN", "BTC", "USD", 1010.0, 0.0008))
            .unwrap();

        let btc = VertexId::new("KRAKEN", "BTC");
        let usd = VertexId::new("KRAKEN", "USD");
        assert_eq!(report.outcome, UpdateOutcome::Updated);
        assert!(report.registered.is_empty());
        assert_eq!(stored(&state, &btc, &usd), Some(1010.0));
        assert_eq!(stored(&state, &usd, &btc), Some(0.0008));
        assert!(state.is_stale());
    }

    #[test]
    fn test_older_quote_discarded_without_staleness() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:43:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        state.rebuild(10).unwrap();

        let report = state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1.0, 1.0))
            .unwrap();

        assert_eq!(report.outcome, UpdateOutcome::Discarded);
        assert!(!state.is_stale());
        assert_eq!(
            stored(&state, &VertexId::new("KRAKEN", "BTC"), &VertexId::new("KRAKEN", "USD")),
            Some(1000.0)
        );
    }

    #[test]
    fn test_equal_timestamp_keeps_existing() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();

        // Same instant written with another offset.
        let report = state
            .apply_quote(&quote("2017-11-01T10:42:23+01:00", "KRAKEN", "BTC", "USD", 5.0, 5.0))
            .unwrap();

        assert_eq!(report.outcome, UpdateOutcome::Discarded);
        assert_eq!(
            stored(&state, &VertexId::new("KRAKEN", "USD"), &VertexId::new("KRAKEN", "BTC")),
            Some(0.0009)
        );
    }

    #[test]
    fn test_reversed_pair_updates_same_edges() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        let report = state
            .apply_quote(&quote("2017-11-01T09:50:00+00:00", "KRAKEN", "USD", "BTC", 0.001, 990.0))
            .unwrap();

        assert_eq!(report.outcome, UpdateOutcome::Updated);
        assert_eq!(
            stored(&state, &VertexId::new("KRAKEN", "BTC"), &VertexId::new("KRAKEN", "USD")),
            Some(990.0)
        );
    }

    #[test]
    fn test_registration_seeds_identity_edges() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        state
            .apply_quote(&quote("2017-11-01T09:43:23+00:00", "GDAX", "BTC", "USD", 1001.0, 0.0008))
            .unwrap();

        for currency in ["BTC", "USD"] {
            let kraken = VertexId::new("KRAKEN", currency);
            let gdax = VertexId::new("GDAX", currency);
            assert_eq!(stored(&state, &kraken, &gdax), Some(IDENTITY_RATE));
            assert_eq!(stored(&state, &gdax, &kraken), Some(IDENTITY_RATE));
        }
    }

    #[test]
    fn test_new_pair_inserted_regardless_of_age() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:43:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        state.rebuild(10).unwrap();

        // Older than anything stored, but the GDAX pair has never been seen.
        let report = state
            .apply_quote(&quote("2017-11-01T09:40:00+00:00", "GDAX", "BTC", "USD", 1001.0, 0.0008))
            .unwrap();
        assert_eq!(report.outcome, UpdateOutcome::Inserted);
        assert_eq!(report.registered.len(), 2);
        assert!(state.is_stale());
    }

    #[test]
    fn test_one_sided_pair_is_invariant_violation() {
        let mut state = GraphState::new();
        state
            .apply_quote(&quote("2017-11-01T09:42:23+00:00", "KRAKEN", "BTC", "USD", 1000.0, 0.0009))
            .unwrap();
        let eur = state
            .registry
            .ensure(
                &VertexId::new("KRAKEN", "EUR"),
                &mut state.store,
                parse_timestamp("2017-11-01T09:42:23+00:00").unwrap(),
            )
            .unwrap()
            .index;
        let btc = state.registry().index_of(&VertexId::new("KRAKEN", "BTC")).unwrap();
        state
            .store
            .set_edge(btc, eur, 30000.0, parse_timestamp("2017-11-01T09:42:23+00:00").unwrap())
            .unwrap();

        let err = state
            .apply_quote(&quote("2017-11-01T09:50:00+00:00", "KRAKEN", "BTC", "EUR", 1.0, 1.0))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    proptest! {
        #[test]
        fn prop_later_timestamp_wins_in_any_order(
            first_secs in 0u32..86_400,
            gap in 1u32..86_400,
            early_rate in 0.001f64..10_000.0,
            late_rate in 0.001f64..10_000.0,
            late_first in any::<bool>(),
        ) {
            let stamp = |secs: u32| format!(
                "2017-11-01T{:02}:{:02}:{:02}+00:00",
                secs / 3600 % 24, secs / 60 % 60, secs % 60
            );
            let early_secs = first_secs.min(86_399 - 1);
            let late_secs = (early_secs + gap).min(86_399);
            prop_assume!(late_secs > early_secs);

            let early = quote(&stamp(early_secs), "KRAKEN", "BTC", "USD", early_rate, 1.0 / early_rate);
            let late = quote(&stamp(late_secs), "KRAKEN", "BTC", "USD", late_rate, 1.0 / late_rate);

            let mut state = GraphState::new();
            if late_first {
                state.apply_quote(&late).unwrap();
                state.apply_quote(&early).unwrap();
            } else {
                state.apply_quote(&early).unwrap();
                state.apply_quote(&late).unwrap();
            }

            let btc = VertexId::new("KRAKEN", "BTC");
            let usd = VertexId::new("KRAKEN", "USD");
            prop_assert_eq!(stored(&state, &btc, &usd), Some(late_rate));
            prop_assert_eq!(stored(&state, &usd, &btc), Some(1.0 / late_rate));
        }
    }
}
