//! Access control pipeline.
//!
//! Every inbound event passes through the gates in [`GATES`] order. The
//! first gate that reaches a decision wins; an event that passes all of
//! them goes to the verification stage, which either evaluates an answer
//! or issues a new challenge.

use crate::ledger::Ledger;
use crate::verify::{self, Outcome, Puzzle};
use ferry_core::UserId;
use rand::Rng;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

/// Named stages of the pipeline, before verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The operator always passes
    Owner,
    /// Banned users are dropped silently
    Blacklist,
    /// Whitelisted and trusted users pass
    Whitelist,
}

/// Gate evaluation order
pub const GATES: [Gate; 3] = [Gate::Owner, Gate::Blacklist, Gate::Whitelist];

/// What to do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Hand the event to the router
    Pass,
    /// Drop without any reply
    Drop,
    /// A new challenge was issued and must be sent
    Challenge(Puzzle),
    /// An answer was evaluated
    Answered(Outcome),
}

/// Applies the gate pipeline to events
#[derive(Debug)]
pub struct AccessControl {
    owner: UserId,
    trusted: BTreeSet<UserId>,
    locks: UserLocks,
}

impl AccessControl {
    /// Create the pipeline for `owner`, letting `trusted` skip the challenge
    pub fn new(owner: UserId, trusted: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            owner,
            trusted: trusted.into_iter().collect(),
            locks: UserLocks::default(),
        }
    }

    /// The operator
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns true if `user` is the operator
    #[must_use]
    pub fn is_owner(&self, user: UserId) -> bool {
        user == self.owner
    }

    /// Serialize handling of `user`'s events.
    ///
    /// Hold the guard for the whole handling of one event, including its
    /// outbound calls.
    pub async fn lock(&self, user: UserId) -> UserGuard {
        self.locks.acquire(user).await
    }

    /// Run `user`'s event through the pipeline.
    ///
    /// `payload` is the event's text, used as the answer while a challenge
    /// is outstanding.
    pub fn decide<R: Rng + ?Sized>(
        &self,
        ledger: &mut Ledger,
        user: UserId,
        payload: Option<&str>,
        rng: &mut R,
    ) -> Decision {
        for gate in GATES {
            if let Some(decision) = self.check(gate, ledger, user) {
                debug!(%user, ?gate, ?decision, "gate decided");
                return decision;
            }
        }

        match verify::submit(ledger, user, payload) {
            Some(outcome) => Decision::Answered(outcome),
            None => Decision::Challenge(verify::issue(ledger, user, rng)),
        }
    }

    fn check(&self, gate: Gate, ledger: &Ledger, user: UserId) -> Option<Decision> {
        match gate {
            Gate::Owner => self.is_owner(user).then_some(Decision::Pass),
            Gate::Blacklist => ledger.is_blacklisted(user).then_some(Decision::Drop),
            Gate::Whitelist => (ledger.is_whitelisted(user) || self.trusted.contains(&user))
                .then_some(Decision::Pass),
        }
    }
}

/// Map of per-user locks, pruned once it grows past this many idle entries
const PRUNE_AT: usize = 1024;

/// Keyed mutexes, one per user
#[derive(Debug, Default)]
pub struct UserLocks {
    slots: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Exclusive hold on one user's lock
#[derive(Debug)]
pub struct UserGuard {
    _guard: OwnedMutexGuard<()>,
}

impl UserLocks {
    /// Wait for exclusive access to `user`
    pub async fn acquire(&self, user: UserId) -> UserGuard {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if slots.len() >= PRUNE_AT {
                // Only the map holds an idle slot
                slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            }
            Arc::clone(slots.entry(user).or_default())
        };

        UserGuard {
            _guard: slot.lock_owned().await,
        }
    }

    /// Number of tracked users
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if no user is tracked
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;
    use chrono::Utc;
    use ferry_core::{AccessState, Challenge};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    const OWNER: UserId = UserId(1);

    fn setup() -> (tempfile::TempDir, Ledger, AccessControl) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::load(Store::open(dir.path()).unwrap(), Utc::now());
        (dir, ledger, AccessControl::new(OWNER, [UserId(77)]))
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn test_owner_always_passes() {
        let (_dir, mut ledger, access) = setup();
        assert_eq!(
            access.decide(&mut ledger, OWNER, Some("/stats"), &mut rng()),
            Decision::Pass
        );
        assert_eq!(ledger.access_state(OWNER), AccessState::Unknown);
    }

    #[test]
    fn test_unknown_user_gets_one_challenge() {
        let (_dir, mut ledger, access) = setup();
        let decision = access.decide(&mut ledger, UserId(5), Some("hello"), &mut rng());
        let Decision::Challenge(puzzle) = decision else {
            panic!("expected a challenge, got {decision:?}");
        };
        assert_eq!(
            ledger.access_state(UserId(5)),
            AccessState::PendingVerification(Challenge::new(puzzle.answer()))
        );

        // The next message is an answer, not a new challenge
        assert_eq!(
            access.decide(&mut ledger, UserId(5), Some("hello"), &mut rng()),
            Decision::Answered(Outcome::Incorrect { remaining: 2 })
        );
    }

    #[test]
    fn test_blacklist_precedes_whitelist() {
        let (_dir, mut ledger, access) = setup();
        ledger.blacklist(UserId(77));
        assert_eq!(
            access.decide(&mut ledger, UserId(77), Some("hi"), &mut rng()),
            Decision::Drop
        );
    }

    #[test]
    fn test_trusted_skips_challenge() {
        let (_dir, mut ledger, access) = setup();
        assert_eq!(
            access.decide(&mut ledger, UserId(77), None, &mut rng()),
            Decision::Pass
        );
        assert_eq!(ledger.access_state(UserId(77)), AccessState::Unknown);
    }

    #[tokio::test]
    async fn test_same_user_is_serialized() {
        let locks = Arc::new(UserLocks::default());
        let first = locks.acquire(UserId(1)).await;

        let contender = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire(UserId(1)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        // Other users are not blocked
        let _other = locks.acquire(UserId(2)).await;

        drop(first);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn test_idle_slots_pruned() {
        let locks = UserLocks::default();
        for id in 0..PRUNE_AT as i64 {
            drop(locks.acquire(UserId(id)).await);
        }
        assert_eq!(locks.len(), PRUNE_AT);

        let _held = locks.acquire(UserId(-1)).await;
        assert_eq!(locks.len(), 1);
    }
}
