//! Composite expiration strategies
//!
//! Composites hold an ordered collection of child strategies and are
//! themselves strategies. [`AllOf`] expires the daemon only when every child
//! agrees; [`AnyOf`] expires it when at least one child does. Both fold the
//! expiring children the same way: `immediate` is OR-ed (honor the most
//! urgent signal), `terminated` is AND-ed (the daemon is only self-ended if
//! every firing signal says so), and reasons are joined into one combined
//! justification.

use crate::{DaemonState, ExpirationStrategy, ExpirationVerdict};

/// Separator between per-criterion reasons in a combined verdict
pub const REASON_SEPARATOR: &str = " and ";

/// Expires the daemon only if all children would expire it.
pub struct AllOf {
    children: Vec<Box<dyn ExpirationStrategy>>,
}

impl AllOf {
    pub fn new(children: Vec<Box<dyn ExpirationStrategy>>) -> Self {
        Self { children }
    }
}

impl ExpirationStrategy for AllOf {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict {
        // No configured criteria means "keep alive".
        if self.children.is_empty() {
            return ExpirationVerdict::not_expired();
        }

        let mut immediate = false;
        let mut terminated = true;
        let mut reasons: Vec<Option<String>> = Vec::new();

        // Children are evaluated in construction order; the first dissenting
        // child ends the scan and nothing accumulated so far survives.
        for child in &self.children {
            let verdict = child.check_expiration(daemon);

            if !verdict.is_expired() {
                return ExpirationVerdict::not_expired();
            }

            immediate = immediate || verdict.is_immediate();
            terminated = terminated && verdict.is_terminated();
            reasons.push(verdict.reason().map(str::to_owned));
        }

        ExpirationVerdict::expire(immediate, terminated, Some(join_reasons(&reasons)))
    }
}

/// Expires the daemon if any child would expire it.
///
/// Unlike [`AllOf`] this scans every child: each firing criterion
/// contributes to the combined justification, so there is nothing to
/// short-circuit on. The folds run over the expiring children only.
pub struct AnyOf {
    children: Vec<Box<dyn ExpirationStrategy>>,
}

impl AnyOf {
    pub fn new(children: Vec<Box<dyn ExpirationStrategy>>) -> Self {
        Self { children }
    }
}

impl ExpirationStrategy for AnyOf {
    fn check_expiration(&self, daemon: &DaemonState) -> ExpirationVerdict {
        let mut expired = false;
        let mut immediate = false;
        let mut terminated = true;
        let mut reasons: Vec<Option<String>> = Vec::new();

        for child in &self.children {
            let verdict = child.check_expiration(daemon);

            if verdict.is_expired() {
                expired = true;
                immediate = immediate || verdict.is_immediate();
                terminated = terminated && verdict.is_terminated();
                reasons.push(verdict.reason().map(str::to_owned));
            }
        }

        // Covers the empty collection too.
        if !expired {
            return ExpirationVerdict::not_expired();
        }

        ExpirationVerdict::expire(immediate, terminated, Some(join_reasons(&reasons)))
    }
}

/// Join reasons with [`REASON_SEPARATOR`], skipping absent ones.
fn join_reasons(reasons: &[Option<String>]) -> String {
    reasons
        .iter()
        .flatten()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(REASON_SEPARATOR)
}
