//! Single owner of every mutable dataset.
//!
//! All reads and writes of the routing table, access lists, pending
//! challenges and statistics go through [`Ledger`]. Each mutation is
//! written through to the [`Store`] before the method returns. A kind whose
//! save failed stays dirty and is retried on the next mutation.
//!
//! Users move between lists through [`Ledger::whitelist`],
//! [`Ledger::blacklist`] and the challenge methods. Each transition saves
//! the destination set before the sets it was removed from, so a crash in
//! between leaves the user in two sets at most. [`Ledger::load`] repairs
//! that with the precedence blacklist > whitelist > pending.

use crate::routing::RoutingTable;
use crate::store::Store;
use chrono::{DateTime, Utc};
use ferry_core::{
    AccessState, Challenge, Counter, MessageId, Statistics, StoreKind, UserId,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};

/// Counters plus the size of every dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Persisted counters
    #[serde(flatten)]
    pub stats: Statistics,
    /// Routing entries
    pub routes: usize,
    /// Whitelisted users
    pub whitelisted: usize,
    /// Banned users
    pub blacklisted: usize,
    /// Outstanding challenges
    pub pending: usize,
}

impl Summary {
    /// Read straight from disk, without repairing or writing anything
    pub fn read(store: &Store) -> Self {
        let routing: RoutingTable = store.load(StoreKind::Mapping);
        let whitelist: BTreeSet<UserId> = store.load(StoreKind::Whitelist);
        let blacklist: BTreeSet<UserId> = store.load(StoreKind::Blacklist);
        let pending: BTreeMap<UserId, Challenge> = store.load(StoreKind::Pending);
        Self {
            stats: store.load(StoreKind::Statistics),
            routes: routing.len(),
            whitelisted: whitelist.len(),
            blacklisted: blacklist.len(),
            pending: pending.len(),
        }
    }
}

/// In-memory mirror of the persisted state
#[derive(Debug)]
pub struct Ledger {
    store: Store,
    routing: RoutingTable,
    whitelist: BTreeSet<UserId>,
    blacklist: BTreeSet<UserId>,
    pending: BTreeMap<UserId, Challenge>,
    stats: Statistics,
    dirty: BTreeSet<StoreKind>,
}

impl Ledger {
    /// Load every dataset, repair overlaps and record the first start time
    pub fn load(store: Store, now: DateTime<Utc>) -> Self {
        let mut ledger = Self {
            routing: store.load(StoreKind::Mapping),
            whitelist: store.load(StoreKind::Whitelist),
            blacklist: store.load(StoreKind::Blacklist),
            pending: store.load(StoreKind::Pending),
            stats: store.load(StoreKind::Statistics),
            store,
            dirty: BTreeSet::new(),
        };

        let mut changed = ledger.reconcile();
        if ledger.stats.mark_started(now) {
            changed.push(StoreKind::Statistics);
        }
        ledger.commit(&changed);

        info!(
            routes = ledger.routing.len(),
            whitelisted = ledger.whitelist.len(),
            blacklisted = ledger.blacklist.len(),
            pending = ledger.pending.len(),
            "state loaded"
        );
        ledger
    }

    /// Drop memberships that lose to a higher-precedence set
    fn reconcile(&mut self) -> Vec<StoreKind> {
        let mut changed = Vec::new();

        let before = (self.whitelist.len(), self.pending.len());
        for user in &self.blacklist {
            self.whitelist.remove(user);
            self.pending.remove(user);
        }
        for user in &self.whitelist {
            self.pending.remove(user);
        }

        if self.whitelist.len() != before.0 {
            changed.push(StoreKind::Whitelist);
        }
        if self.pending.len() != before.1 {
            changed.push(StoreKind::Pending);
        }
        if !changed.is_empty() {
            warn!(?changed, "repaired overlapping access lists");
        }
        changed
    }

    /// Persist the given kinds plus any left dirty by an earlier failure
    fn commit(&mut self, kinds: &[StoreKind]) {
        let mut order: Vec<StoreKind> = kinds.to_vec();
        order.extend(self.dirty.iter().copied().filter(|k| !kinds.contains(k)));

        for kind in order {
            match self.save(kind) {
                Ok(()) => {
                    self.dirty.remove(&kind);
                }
                Err(e) => {
                    warn!(error = %e, "save failed, will retry on next change");
                    self.dirty.insert(kind);
                }
            }
        }
    }

    fn save(&self, kind: StoreKind) -> crate::error::StoreResult<()> {
        match kind {
            StoreKind::Mapping => self.store.save(kind, &self.routing),
            StoreKind::Whitelist => self.store.save(kind, &self.whitelist),
            StoreKind::Blacklist => self.store.save(kind, &self.blacklist),
            StoreKind::Pending => self.store.save(kind, &self.pending),
            StoreKind::Statistics => self.store.save(kind, &self.stats),
        }
    }

    /// Kinds whose latest contents are not yet on disk
    #[must_use]
    pub fn unsaved(&self) -> Vec<StoreKind> {
        self.dirty.iter().copied().collect()
    }

    // ---- access lists -------------------------------------------------

    /// Where `user` stands, not considering the operator
    #[must_use]
    pub fn access_state(&self, user: UserId) -> AccessState {
        if self.blacklist.contains(&user) {
            AccessState::Blacklisted
        } else if self.whitelist.contains(&user) {
            AccessState::Whitelisted
        } else if let Some(challenge) = self.pending.get(&user) {
            AccessState::PendingVerification(*challenge)
        } else {
            AccessState::Unknown
        }
    }

    /// Returns true if `user` is banned
    #[must_use]
    pub fn is_blacklisted(&self, user: UserId) -> bool {
        self.blacklist.contains(&user)
    }

    /// Returns true if `user` may relay
    #[must_use]
    pub fn is_whitelisted(&self, user: UserId) -> bool {
        self.whitelist.contains(&user)
    }

    /// Outstanding challenge for `user`
    #[must_use]
    pub fn challenge(&self, user: UserId) -> Option<Challenge> {
        self.pending.get(&user).copied()
    }

    /// Whitelisted users in id order
    #[must_use]
    pub fn whitelisted(&self) -> Vec<UserId> {
        self.whitelist.iter().copied().collect()
    }

    /// Banned users in id order
    #[must_use]
    pub fn blacklisted(&self) -> Vec<UserId> {
        self.blacklist.iter().copied().collect()
    }

    /// Move `user` to the whitelist. Returns false if already there.
    pub fn whitelist(&mut self, user: UserId) -> bool {
        self.admit(user, false)
    }

    /// Move `user` to the blacklist. Returns false if already there.
    pub fn blacklist(&mut self, user: UserId) -> bool {
        self.exclude(user, false)
    }

    fn admit(&mut self, user: UserId, verified: bool) -> bool {
        if !self.whitelist.insert(user) {
            return false;
        }
        let mut kinds = vec![StoreKind::Whitelist];
        if self.blacklist.remove(&user) {
            kinds.push(StoreKind::Blacklist);
        }
        if self.pending.remove(&user).is_some() {
            kinds.push(StoreKind::Pending);
        }
        if verified {
            self.stats.bump(Counter::VerifiedUsers);
            kinds.push(StoreKind::Statistics);
        }
        self.commit(&kinds);
        debug!(%user, "whitelisted");
        true
    }

    fn exclude(&mut self, user: UserId, failed_challenge: bool) -> bool {
        if !self.blacklist.insert(user) {
            return false;
        }
        let mut kinds = vec![StoreKind::Blacklist];
        if self.whitelist.remove(&user) {
            kinds.push(StoreKind::Whitelist);
        }
        if self.pending.remove(&user).is_some() {
            kinds.push(StoreKind::Pending);
        }
        if failed_challenge {
            self.stats.bump(Counter::BlockedAttempts);
            kinds.push(StoreKind::Statistics);
        }
        self.commit(&kinds);
        debug!(%user, "blacklisted");
        true
    }

    /// Import bans from an older release. Returns how many were new.
    pub fn import_bans(&mut self, users: &[UserId]) -> usize {
        let fresh: Vec<UserId> = users
            .iter()
            .copied()
            .filter(|u| !self.blacklist.contains(u))
            .collect();
        if fresh.is_empty() {
            return 0;
        }

        self.blacklist.extend(fresh.iter().copied());
        let mut kinds = vec![StoreKind::Blacklist];
        let before = (self.whitelist.len(), self.pending.len());
        for user in &fresh {
            self.whitelist.remove(user);
            self.pending.remove(user);
        }
        if self.whitelist.len() != before.0 {
            kinds.push(StoreKind::Whitelist);
        }
        if self.pending.len() != before.1 {
            kinds.push(StoreKind::Pending);
        }
        self.commit(&kinds);
        fresh.len()
    }

    // ---- challenges ---------------------------------------------------

    /// Record a freshly issued challenge for an unknown user
    pub fn begin_challenge(&mut self, user: UserId, challenge: Challenge) {
        debug_assert!(!self.whitelist.contains(&user) && !self.blacklist.contains(&user));
        self.pending.insert(user, challenge);
        self.commit(&[StoreKind::Pending]);
    }

    /// Take back a fresh challenge that never reached `user`.
    ///
    /// Returns false if the pending record no longer matches `challenge`.
    pub fn withdraw_challenge(&mut self, user: UserId, challenge: Challenge) -> bool {
        if self.pending.get(&user) != Some(&challenge) {
            return false;
        }
        self.pending.remove(&user);
        self.commit(&[StoreKind::Pending]);
        true
    }

    /// Store the updated attempt count of a still-open challenge
    pub fn record_attempt(&mut self, user: UserId, challenge: Challenge) {
        self.pending.insert(user, challenge);
        self.commit(&[StoreKind::Pending]);
    }

    /// A correct answer: whitelist and count the verification
    pub fn pass_challenge(&mut self, user: UserId) {
        self.admit(user, true);
    }

    /// Attempts exhausted: blacklist and count the block
    pub fn fail_challenge(&mut self, user: UserId) {
        self.exclude(user, true);
    }

    // ---- routing ------------------------------------------------------

    /// Remember who sent the original behind a relayed message, and count it
    pub fn record_relay(&mut self, relayed: MessageId, sender: UserId) {
        self.routing.record(relayed, sender);
        self.stats.bump(Counter::Forwarded);
        self.commit(&[StoreKind::Mapping, StoreKind::Statistics]);
    }

    /// Sender of the original behind a relayed message
    #[must_use]
    pub fn resolve(&self, relayed: MessageId) -> Option<UserId> {
        self.routing.resolve(relayed)
    }

    /// Forget every route. Returns how many were dropped.
    pub fn clear_routes(&mut self) -> usize {
        let count = self.routing.clear();
        self.commit(&[StoreKind::Mapping]);
        count
    }

    /// Number of stored routes
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routing.len()
    }

    /// Number of stored routes pointing at `user`
    #[must_use]
    pub fn routes_for(&self, user: UserId) -> usize {
        self.routing.count_for(user)
    }

    // ---- statistics ---------------------------------------------------

    /// Increment a counter
    pub fn bump(&mut self, counter: Counter) {
        self.stats.bump(counter);
        self.commit(&[StoreKind::Statistics]);
    }

    /// Current statistics
    #[must_use]
    pub const fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Counters and dataset sizes
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            stats: self.stats.clone(),
            routes: self.routing.len(),
            whitelisted: self.whitelist.len(),
            blacklisted: self.blacklist.len(),
            pending: self.pending.len(),
        }
    }
}
