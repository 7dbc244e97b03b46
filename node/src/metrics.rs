//! Prometheus metrics for vote sessions.
//!
//! [`SessionMetrics`] owns a dedicated [`Registry`] that the daemon's
//! `/metrics` endpoint encodes into the Prometheus text exposition format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, IntCounter,
    IntGauge, Opts, Registry, TextEncoder,
};

use joinvote_types::Outcome;

/// Central collection of all session-level Prometheus metrics.
pub struct SessionMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Join requests that got a vote session.
    pub sessions_started: IntCounter,
    /// Requests admitted, by vote or by an admin.
    pub sessions_approved: IntCounter,
    /// Requests denied by vote (including ties) or by an admin.
    pub sessions_rejected: IntCounter,
    /// Requests denied because too few members voted.
    pub sessions_insufficient: IntCounter,
    /// Sessions that could not open a ballot at all.
    pub sessions_aborted: IntCounter,
    /// Requests resolved by an admin before the vote ended.
    pub manual_overrides: IntCounter,
    /// Ballots that fell back from a poll to per-voter buttons.
    pub poll_fallbacks: IntCounter,
    /// Per-voter votes accepted.
    pub votes_cast: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Sessions currently registered.
    pub active_sessions: IntGauge,
}

impl SessionMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let sessions_started = register_int_counter_with_registry!(
            Opts::new(
                "joinvote_sessions_started_total",
                "Join requests put to a vote"
            ),
            registry
        )?;
        let sessions_approved = register_int_counter_with_registry!(
            Opts::new("joinvote_sessions_approved_total", "Join requests approved"),
            registry
        )?;
        let sessions_rejected = register_int_counter_with_registry!(
            Opts::new("joinvote_sessions_rejected_total", "Join requests rejected"),
            registry
        )?;
        let sessions_insufficient = register_int_counter_with_registry!(
            Opts::new(
                "joinvote_sessions_insufficient_total",
                "Join requests denied for lack of voters"
            ),
            registry
        )?;
        let sessions_aborted = register_int_counter_with_registry!(
            Opts::new(
                "joinvote_sessions_aborted_total",
                "Sessions aborted because no ballot could be opened"
            ),
            registry
        )?;
        let manual_overrides = register_int_counter_with_registry!(
            Opts::new(
                "joinvote_manual_overrides_total",
                "Join requests resolved manually by an admin"
            ),
            registry
        )?;
        let poll_fallbacks = register_int_counter_with_registry!(
            Opts::new(
                "joinvote_poll_fallbacks_total",
                "Ballots that fell back from a poll to per-voter buttons"
            ),
            registry
        )?;
        let votes_cast = register_int_counter_with_registry!(
            Opts::new("joinvote_votes_cast_total", "Per-voter votes accepted"),
            registry
        )?;
        let active_sessions = register_int_gauge_with_registry!(
            Opts::new("joinvote_active_sessions", "Vote sessions currently running"),
            registry
        )?;

        Ok(Self {
            registry,
            sessions_started,
            sessions_approved,
            sessions_rejected,
            sessions_insufficient,
            sessions_aborted,
            manual_overrides,
            poll_fallbacks,
            votes_cast,
            active_sessions,
        })
    }

    /// Count a session's terminal outcome.
    pub fn record_outcome(&self, outcome: Outcome) {
        match outcome {
            Outcome::Approved => self.sessions_approved.inc(),
            Outcome::Rejected { .. } => self.sessions_rejected.inc(),
            Outcome::InsufficientVoters => self.sessions_insufficient.inc(),
            Outcome::Aborted => self.sessions_aborted.inc(),
        }
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_land_in_their_counters() {
        let metrics = SessionMetrics::new().unwrap();
        metrics.record_outcome(Outcome::Approved);
        metrics.record_outcome(Outcome::Rejected { tie: true });
        metrics.record_outcome(Outcome::InsufficientVoters);
        assert_eq!(metrics.sessions_approved.get(), 1);
        assert_eq!(metrics.sessions_rejected.get(), 1);
        assert_eq!(metrics.sessions_insufficient.get(), 1);
        assert_eq!(metrics.sessions_aborted.get(), 0);
    }

    #[test]
    fn text_encoding_lists_metric_names() {
        let metrics = SessionMetrics::new().unwrap();
        metrics.sessions_started.inc();
        let text = metrics.encode_text().unwrap();
        assert!(text.contains("joinvote_sessions_started_total 1"));
        assert!(text.contains("joinvote_active_sessions"));
    }
}
