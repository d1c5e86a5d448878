//! Group registry, score ledger and the per-group critical sections guarding them.
//!
//! Every mutation follows the same shape: take the group's lock, mutate the in-memory
//! tables synchronously, then persist the whole document before the lock is released.
//! A failed save is reported to the caller but the in-memory change is kept.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use dashmap::DashMap;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    dao::{
        league_store::LeagueStore,
        models::{LeagueDocument, MemberRecord},
        storage::StorageResult,
    },
    state::{
        cooldown,
        leaderboard::{self, LeaderboardEntry, MemberStanding},
        member::{GroupId, Member, MemberId, Points, WorkoutCategory},
    },
};

/// Result of a group registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The name was free and is now bound to the identifier.
    Registered,
    /// The name was already taken; nothing changed.
    AlreadyRegistered {
        /// Identifier the name is bound to.
        id: GroupId,
    },
    /// The identifier is already bound to another name; nothing changed.
    IdentifierInUse {
        /// Name the identifier is bound to.
        name: String,
    },
}

impl RegisterOutcome {
    /// Whether the call created the group.
    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterOutcome::Registered)
    }
}

/// Result of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The member was added with zero points.
    Joined,
    /// The member was already in the group; nothing changed.
    AlreadyMember,
    /// No group is registered under that name.
    GroupNotRegistered,
}

/// Result of a cooldown-gated scoring attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardOutcome {
    /// Points were added; `total` is the new balance.
    Awarded {
        /// Points granted for this workout.
        points: Points,
        /// Balance after the award.
        total: Points,
    },
    /// The member scored too recently.
    RateLimited {
        /// Remaining wait before the member may score again.
        retry_after: Duration,
    },
    /// No group is registered under that name.
    GroupNotRegistered,
    /// The member has not joined the group.
    NotAMember,
}

/// Result of removing a member from a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// Whether the member was present.
    pub removed: bool,
    /// Points held when removed; zero when absent.
    pub points_at_removal: Points,
}

/// The league engine: registry, ledger, cooldown gate and ranking.
pub struct League {
    store: Arc<dyn LeagueStore>,
    registry: DashMap<String, GroupId>,
    ledger: DashMap<GroupId, HashMap<MemberId, Member>>,
    group_locks: DashMap<GroupId, Arc<Mutex<()>>>,
    registry_gate: Mutex<()>,
    save_gate: Mutex<()>,
    cooldown: Duration,
    last_save_ok: AtomicBool,
}

impl League {
    /// Rebuild the league from `store`.
    ///
    /// Ledger entries whose group is missing from the registry are dropped, and registered
    /// groups without a ledger entry get an empty one.
    pub async fn load(store: Arc<dyn LeagueStore>, cooldown: Duration) -> StorageResult<Self> {
        let LeagueDocument { groups, mut scores } = store.load().await?;

        let registry = DashMap::new();
        let ledger = DashMap::new();
        for (name, id) in groups {
            let members = scores
                .remove(&id)
                .unwrap_or_default()
                .into_iter()
                .map(|(member_id, record)| (member_id, Member::from(record)))
                .collect::<HashMap<_, _>>();
            debug!(group = %name, group_id = %id, members = members.len(), "restored group");
            ledger.insert(id.clone(), members);
            registry.insert(name, id);
        }

        for orphan in scores.keys() {
            warn!(group_id = %orphan, "dropping ledger entry without a registered group");
        }

        info!(groups = registry.len(), "league loaded");

        Ok(Self {
            store,
            registry,
            ledger,
            group_locks: DashMap::new(),
            registry_gate: Mutex::new(()),
            save_gate: Mutex::new(()),
            cooldown,
            last_save_ok: AtomicBool::new(true),
        })
    }

    /// Cooldown applied between two scoring events of the same member.
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Whether the most recent save reached the store.
    pub fn is_healthy(&self) -> bool {
        self.last_save_ok.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Group registry
    // -----------------------------------------------------------------------

    /// Number of registered groups.
    pub fn group_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether `name` is bound to a group.
    pub fn is_group_registered(&self, name: &str) -> bool {
        self.registry.contains_key(name)
    }

    /// Identifier bound to `name`, if registered.
    pub fn group_id(&self, name: &str) -> Option<GroupId> {
        self.registry.get(name).map(|entry| entry.value().clone())
    }

    /// Bind `name` to `id` unless either is already in use.
    pub async fn register_group(&self, name: &str, id: GroupId) -> StorageResult<RegisterOutcome> {
        let _gate = self.registry_gate.lock().await;

        if let Some(existing) = self.group_id(name) {
            debug!(group = %name, group_id = %existing, "group already registered");
            return Ok(RegisterOutcome::AlreadyRegistered { id: existing });
        }

        if let Some(bound_name) = self.group_name(&id) {
            warn!(
                group = %name,
                group_id = %id,
                bound = %bound_name,
                "group identifier already in use"
            );
            return Ok(RegisterOutcome::IdentifierInUse { name: bound_name });
        }

        let lock = self.group_lock(&id);
        let _guard = lock.lock().await;
        self.ledger.insert(id.clone(), HashMap::new());
        self.registry.insert(name.to_owned(), id.clone());
        info!(group = %name, group_id = %id, "registered group");

        self.persist().await?;
        Ok(RegisterOutcome::Registered)
    }

    /// Forget `name` and every member of its group. Returns whether it was registered.
    pub async fn unregister_group(&self, name: &str) -> StorageResult<bool> {
        let _gate = self.registry_gate.lock().await;

        let Some(id) = self.group_id(name) else {
            debug!(group = %name, "cannot unregister unknown group");
            return Ok(false);
        };

        self.drop_group(name, id).await?;
        Ok(true)
    }

    /// Forget whichever group is bound to `id`, leaving same-named groups of other chats alone.
    pub async fn unregister_group_id(&self, id: &GroupId) -> StorageResult<bool> {
        let _gate = self.registry_gate.lock().await;

        let Some(name) = self.group_name(id) else {
            debug!(group_id = %id, "no group bound to identifier");
            return Ok(false);
        };

        self.drop_group(&name, id.clone()).await?;
        Ok(true)
    }

    /// Name bound to `id`, if any.
    pub fn group_name(&self, id: &GroupId) -> Option<String> {
        self.registry
            .iter()
            .find(|entry| entry.value() == id)
            .map(|entry| entry.key().clone())
    }

    // Caller holds `registry_gate`.
    async fn drop_group(&self, name: &str, id: GroupId) -> StorageResult<()> {
        let lock = self.group_lock(&id);
        let _guard = lock.lock().await;
        self.registry.remove(name);
        let members = self
            .ledger
            .remove(&id)
            .map(|(_, members)| members.len())
            .unwrap_or_default();
        self.group_locks.remove(&id);
        info!(group = %name, group_id = %id, members, "unregistered group");

        self.persist().await
    }

    // -----------------------------------------------------------------------
    // Score ledger
    // -----------------------------------------------------------------------

    /// Whether `member_id` has joined the group `group_id`.
    pub fn is_member(&self, group_id: &GroupId, member_id: &MemberId) -> bool {
        self.ledger
            .get(group_id)
            .is_some_and(|members| members.contains_key(member_id))
    }

    /// Membership check addressed by group name.
    pub fn is_member_registered(&self, name: &str, member_id: &MemberId) -> bool {
        self.group_id(name)
            .is_some_and(|id| self.is_member(&id, member_id))
    }

    /// Copy of a member's current state.
    pub fn member(&self, group_id: &GroupId, member_id: &MemberId) -> Option<Member> {
        self.ledger
            .get(group_id)
            .and_then(|members| members.get(member_id).cloned())
    }

    /// Add `member_id` to the group registered as `name`.
    pub async fn join_group(
        &self,
        name: &str,
        member_id: &MemberId,
        display_name: &str,
        now: OffsetDateTime,
    ) -> StorageResult<JoinOutcome> {
        let Some(id) = self.group_id(name) else {
            return Ok(JoinOutcome::GroupNotRegistered);
        };

        let lock = self.group_lock(&id);
        let _guard = lock.lock().await;
        {
            let Some(mut members) = self.ledger.get_mut(&id) else {
                return Ok(JoinOutcome::GroupNotRegistered);
            };
            match members.entry(member_id.clone()) {
                Entry::Occupied(_) => {
                    debug!(group = %name, member = %member_id, "member already joined");
                    return Ok(JoinOutcome::AlreadyMember);
                }
                Entry::Vacant(slot) => {
                    slot.insert(Member::new(display_name.to_owned(), now));
                }
            }
        }
        info!(group = %name, member = %member_id, display_name, "member joined");

        self.persist().await?;
        Ok(JoinOutcome::Joined)
    }

    /// Add `delta` points without consulting the cooldown.
    ///
    /// Returns the new total, or `None` when the member is not in the group. Callers are
    /// expected to have checked eligibility; prefer [`League::try_award_points`].
    pub async fn award(
        &self,
        group_id: &GroupId,
        member_id: &MemberId,
        delta: Points,
        now: OffsetDateTime,
    ) -> StorageResult<Option<Points>> {
        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;
        let total = self.ledger.get_mut(group_id).and_then(|mut members| {
            members
                .get_mut(member_id)
                .map(|member| member.record_workout(delta, now))
        });

        let Some(total) = total else {
            return Ok(None);
        };
        info!(group_id = %group_id, member = %member_id, delta, total, "points awarded");

        self.persist().await?;
        Ok(Some(total))
    }

    /// Award a workout if the member is out of cooldown.
    ///
    /// The eligibility check, the update and the save happen under the group's lock, so two
    /// concurrent attempts by the same member cannot both succeed.
    pub async fn try_award_points(
        &self,
        name: &str,
        member_id: &MemberId,
        category: WorkoutCategory,
        now: OffsetDateTime,
    ) -> StorageResult<AwardOutcome> {
        let Some(id) = self.group_id(name) else {
            return Ok(AwardOutcome::GroupNotRegistered);
        };

        let lock = self.group_lock(&id);
        let _guard = lock.lock().await;
        let points = category.points();
        let total = {
            let Some(mut members) = self.ledger.get_mut(&id) else {
                return Ok(AwardOutcome::GroupNotRegistered);
            };
            let Some(member) = members.get_mut(member_id) else {
                return Ok(AwardOutcome::NotAMember);
            };
            if let Some(retry_after) = cooldown::retry_after(member.last_update, now, self.cooldown)
            {
                debug!(
                    group = %name,
                    member = %member_id,
                    retry_after_secs = retry_after.whole_seconds(),
                    "workout rejected by cooldown"
                );
                return Ok(AwardOutcome::RateLimited { retry_after });
            }
            member.record_workout(points, now)
        };
        info!(
            group = %name,
            member = %member_id,
            category = category.as_str(),
            points,
            total,
            "workout recorded"
        );

        self.persist().await?;
        Ok(AwardOutcome::Awarded { points, total })
    }

    /// Drop a member from a group, reporting the points they held.
    pub async fn remove(&self, group_id: &GroupId, member_id: &MemberId) -> StorageResult<Removal> {
        let lock = self.group_lock(group_id);
        let _guard = lock.lock().await;
        let removed = self
            .ledger
            .get_mut(group_id)
            .and_then(|mut members| members.remove(member_id));

        let Some(member) = removed else {
            return Ok(Removal {
                removed: false,
                points_at_removal: 0,
            });
        };
        info!(group_id = %group_id, member = %member_id, points = member.points, "member removed");

        self.persist().await?;
        Ok(Removal {
            removed: true,
            points_at_removal: member.points,
        })
    }

    /// Name-addressed [`League::remove`]; `None` when the group is not registered.
    pub async fn remove_member(
        &self,
        name: &str,
        member_id: &MemberId,
    ) -> StorageResult<Option<Removal>> {
        match self.group_id(name) {
            Some(id) => self.remove(&id, member_id).await.map(Some),
            None => Ok(None),
        }
    }

    // -----------------------------------------------------------------------
    // Read-only projections
    // -----------------------------------------------------------------------

    /// Members of a group in no particular order.
    pub fn snapshot(&self, group_id: &GroupId) -> Vec<MemberStanding> {
        self.ledger
            .get(group_id)
            .map(|members| {
                members
                    .iter()
                    .map(|(member_id, member)| MemberStanding {
                        member_id: member_id.clone(),
                        display_name: member.display_name.clone(),
                        points: member.points,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Ranked members of the group registered as `name`; `None` when it is not registered.
    pub fn leaderboard(&self, name: &str) -> Option<Vec<LeaderboardEntry>> {
        self.group_id(name)
            .map(|id| leaderboard::rank(self.snapshot(&id)))
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the current state to the store. Called once more on shutdown.
    pub async fn flush(&self) -> StorageResult<()> {
        self.persist().await
    }

    fn group_lock(&self, id: &GroupId) -> Arc<Mutex<()>> {
        self.group_locks.entry(id.clone()).or_default().clone()
    }

    fn document(&self) -> LeagueDocument {
        let groups = self
            .registry
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        let scores = self
            .ledger
            .iter()
            .map(|entry| {
                let members = entry
                    .value()
                    .iter()
                    .map(|(member_id, member)| (member_id.clone(), MemberRecord::from(member)))
                    .collect::<HashMap<_, _>>();
                (entry.key().clone(), members)
            })
            .collect();

        LeagueDocument { groups, scores }
    }

    async fn persist(&self) -> StorageResult<()> {
        let _gate = self.save_gate.lock().await;
        let document = self.document();

        match self.store.save(document).await {
            Ok(()) => {
                self.last_save_ok.store(true, Ordering::SeqCst);
                Ok(())
            }
            Err(err) => {
                error!(
                    error = %err,
                    "failed to persist league; in-memory state is ahead of the store"
                );
                self.last_save_ok.store(false, Ordering::SeqCst);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::dao::league_store::{JsonFileStore, MemoryStore};

    const T: OffsetDateTime = datetime!(2026-10-16 15:00 UTC);

    async fn league_with(store: Arc<dyn LeagueStore>) -> League {
        League::load(store, cooldown::DEFAULT_COOLDOWN).await.unwrap()
    }

    async fn eagles() -> (Arc<MemoryStore>, League) {
        let store = Arc::new(MemoryStore::new());
        let league = league_with(store.clone()).await;
        league
            .register_group("Eagles", GroupId::from(-100123_i64))
            .await
            .unwrap();
        (store, league)
    }

    #[tokio::test]
    async fn registration_is_idempotent() {
        let (store, league) = eagles().await;
        assert!(league.is_group_registered("Eagles"));
        let saves = store.save_count();

        let second = league
            .register_group("Eagles", GroupId::from("other"))
            .await
            .unwrap();

        assert_eq!(
            second,
            RegisterOutcome::AlreadyRegistered {
                id: GroupId::from(-100123_i64)
            }
        );
        assert_eq!(league.group_id("Eagles"), Some(GroupId::from(-100123_i64)));
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn identifier_cannot_back_two_names() {
        let (_store, league) = eagles().await;

        let outcome = league
            .register_group("Hawks", GroupId::from(-100123_i64))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RegisterOutcome::IdentifierInUse {
                name: "Eagles".into()
            }
        );
        assert!(!league.is_group_registered("Hawks"));
    }

    #[tokio::test]
    async fn join_requires_registered_group() {
        let store = Arc::new(MemoryStore::new());
        let league = league_with(store).await;

        let outcome = league
            .join_group("Nobody", &MemberId::from(1_i64), "Sam", T)
            .await
            .unwrap();

        assert_eq!(outcome, JoinOutcome::GroupNotRegistered);
    }

    #[tokio::test]
    async fn joined_member_starts_at_zero_and_can_score_immediately() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from(42_i64);

        assert_eq!(
            league.join_group("Eagles", &sam, "Sam", T).await.unwrap(),
            JoinOutcome::Joined
        );
        assert_eq!(
            league.join_group("Eagles", &sam, "Sammy", T).await.unwrap(),
            JoinOutcome::AlreadyMember
        );
        let id = league.group_id("Eagles").unwrap();
        assert_eq!(league.member(&id, &sam).unwrap().points, 0);

        let outcome = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Track, T)
            .await
            .unwrap();
        assert_eq!(outcome, AwardOutcome::Awarded { points: 2, total: 2 });
    }

    #[tokio::test]
    async fn cooldown_blocks_until_a_full_hour_passed() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from(42_i64);
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();
        league
            .try_award_points("Eagles", &sam, WorkoutCategory::Gym, T)
            .await
            .unwrap();

        let early = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Gym, T + Duration::minutes(59))
            .await
            .unwrap();
        assert_eq!(
            early,
            AwardOutcome::RateLimited {
                retry_after: Duration::MINUTE
            }
        );

        let on_time = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Gym, T + Duration::minutes(60))
            .await
            .unwrap();
        assert_eq!(on_time, AwardOutcome::Awarded { points: 1, total: 2 });
    }

    #[tokio::test]
    async fn eagles_scenario_totals_six_points() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from("42");
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();

        let field = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Field, T)
            .await
            .unwrap();
        assert_eq!(field, AwardOutcome::Awarded { points: 5, total: 5 });

        let too_soon = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Gym, T + Duration::minutes(10))
            .await
            .unwrap();
        assert!(matches!(too_soon, AwardOutcome::RateLimited { .. }));

        let later = league
            .try_award_points("Eagles", &sam, WorkoutCategory::Gym, T + Duration::minutes(61))
            .await
            .unwrap();
        assert_eq!(later, AwardOutcome::Awarded { points: 1, total: 6 });
    }

    #[tokio::test]
    async fn rate_limited_attempt_does_not_persist() {
        let (store, league) = eagles().await;
        let sam = MemberId::from(42_i64);
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();
        league
            .try_award_points("Eagles", &sam, WorkoutCategory::Field, T)
            .await
            .unwrap();
        let saves = store.save_count();

        league
            .try_award_points("Eagles", &sam, WorkoutCategory::Field, T + Duration::minutes(1))
            .await
            .unwrap();

        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn non_member_cannot_score() {
        let (_store, league) = eagles().await;

        let outcome = league
            .try_award_points("Eagles", &MemberId::from(7_i64), WorkoutCategory::Gym, T)
            .await
            .unwrap();

        assert_eq!(outcome, AwardOutcome::NotAMember);
    }

    #[tokio::test]
    async fn unchecked_award_skips_cooldown() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from(42_i64);
        let id = league.group_id("Eagles").unwrap();
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();

        assert_eq!(league.award(&id, &sam, 5, T).await.unwrap(), Some(5));
        assert_eq!(league.award(&id, &sam, 5, T).await.unwrap(), Some(10));
        assert_eq!(
            league.award(&id, &MemberId::from(7_i64), 5, T).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn re_registering_starts_with_empty_ledger() {
        let (_store, league) = eagles().await;
        league
            .join_group("Eagles", &MemberId::from(42_i64), "Sam", T)
            .await
            .unwrap();

        assert!(league.unregister_group("Eagles").await.unwrap());
        assert!(!league.unregister_group("Eagles").await.unwrap());
        assert!(
            league
                .register_group("Eagles", GroupId::from(-100123_i64))
                .await
                .unwrap()
                .is_registered()
        );

        assert_eq!(league.leaderboard("Eagles"), Some(Vec::new()));
        assert!(!league.is_member_registered("Eagles", &MemberId::from(42_i64)));
    }

    #[tokio::test]
    async fn unregistering_by_id_ignores_other_chats() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from(42_i64);
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();

        assert!(!league.unregister_group_id(&GroupId::from(-999_i64)).await.unwrap());
        assert!(league.is_member_registered("Eagles", &sam));

        let id = GroupId::from(-100123_i64);
        assert_eq!(league.group_name(&id).as_deref(), Some("Eagles"));
        assert!(league.unregister_group_id(&id).await.unwrap());
        assert!(!league.is_group_registered("Eagles"));
        assert_eq!(league.group_name(&id), None);
    }

    #[tokio::test]
    async fn unregistering_releases_the_group_lock() {
        let (_store, league) = eagles().await;
        let id = league.group_id("Eagles").unwrap();
        league
            .join_group("Eagles", &MemberId::from(42_i64), "Sam", T)
            .await
            .unwrap();
        assert!(league.group_locks.contains_key(&id));

        league.unregister_group("Eagles").await.unwrap();

        assert!(league.group_locks.is_empty());
    }

    #[tokio::test]
    async fn remove_reports_points_held() {
        let (_store, league) = eagles().await;
        let sam = MemberId::from(42_i64);
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();
        league
            .try_award_points("Eagles", &sam, WorkoutCategory::Field, T)
            .await
            .unwrap();

        let removal = league.remove_member("Eagles", &sam).await.unwrap();
        assert_eq!(
            removal,
            Some(Removal {
                removed: true,
                points_at_removal: 5
            })
        );

        let again = league.remove_member("Eagles", &sam).await.unwrap();
        assert_eq!(
            again,
            Some(Removal {
                removed: false,
                points_at_removal: 0
            })
        );
        assert_eq!(league.remove_member("Hawks", &sam).await.unwrap(), None);
    }

    #[tokio::test]
    async fn leaderboard_orders_by_points_then_identifier() {
        let (_store, league) = eagles().await;
        let id = league.group_id("Eagles").unwrap();
        for (member, name, points) in [("b", "B", 10), ("c", "C", 20), ("a", "A", 10)] {
            let member = MemberId::from(member);
            league.join_group("Eagles", &member, name, T).await.unwrap();
            league.award(&id, &member, points, T).await.unwrap();
        }

        let board = league.leaderboard("Eagles").unwrap();
        let rows: Vec<_> = board
            .iter()
            .map(|entry| (entry.rank, entry.display_name.as_str(), entry.points))
            .collect();

        assert_eq!(rows, vec![(1, "C", 20), (2, "A", 10), (3, "B", 10)]);
        assert_eq!(league.leaderboard("Hawks"), None);
    }

    #[tokio::test]
    async fn failed_save_keeps_in_memory_change() {
        let (store, league) = eagles().await;
        store.fail_saves(true);
        let sam = MemberId::from(42_i64);

        let result = league.join_group("Eagles", &sam, "Sam", T).await;

        assert!(result.is_err());
        assert!(league.is_member_registered("Eagles", &sam));
        assert!(!league.is_healthy());

        store.fail_saves(false);
        league.flush().await.unwrap();
        assert!(league.is_healthy());
        assert_eq!(store.document().scores[&GroupId::from(-100123_i64)].len(), 1);
    }

    #[tokio::test]
    async fn concurrent_attempts_award_once_per_cooldown() {
        let (_store, league) = eagles().await;
        let league = Arc::new(league);
        let sam = MemberId::from(42_i64);
        league.join_group("Eagles", &sam, "Sam", T).await.unwrap();

        let attempts = (0..16).map(|_| {
            let league = league.clone();
            let sam = sam.clone();
            tokio::spawn(async move {
                league
                    .try_award_points("Eagles", &sam, WorkoutCategory::Field, T)
                    .await
                    .unwrap()
            })
        });
        let mut awarded = 0;
        for attempt in attempts.collect::<Vec<_>>() {
            if matches!(attempt.await.unwrap(), AwardOutcome::Awarded { .. }) {
                awarded += 1;
            }
        }

        assert_eq!(awarded, 1);
        let id = league.group_id("Eagles").unwrap();
        assert_eq!(league.member(&id, &sam).unwrap().points, 5);
    }

    #[tokio::test]
    async fn concurrent_joins_across_groups_are_all_kept() {
        let store = Arc::new(MemoryStore::new());
        let league = Arc::new(league_with(store.clone()).await);
        for group in 0..4i64 {
            league
                .register_group(&format!("team-{group}"), GroupId::from(group))
                .await
                .unwrap();
        }

        let joins = (0..40i64).map(|member| {
            let league = league.clone();
            tokio::spawn(async move {
                let group = format!("team-{}", member % 4);
                league
                    .join_group(&group, &MemberId::from(member), "member", T)
                    .await
                    .unwrap()
            })
        });
        for join in joins.collect::<Vec<_>>() {
            assert_eq!(join.await.unwrap(), JoinOutcome::Joined);
        }

        let document = store.document();
        let persisted: usize = document.scores.values().map(HashMap::len).sum();
        assert_eq!(persisted, 40);
    }

    #[tokio::test]
    async fn state_survives_reload_at_minute_granularity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("league.json");
        let sam = MemberId::from(42_i64);
        let alex = MemberId::from(7_i64);
        let scored_at = datetime!(2026-10-16 15:05:37 UTC);

        {
            let league = league_with(Arc::new(JsonFileStore::new(&path))).await;
            league
                .register_group("Eagles", GroupId::from(-100123_i64))
                .await
                .unwrap();
            league.join_group("Eagles", &sam, "Sam", T).await.unwrap();
            league.join_group("Eagles", &alex, "Alex", T).await.unwrap();
            league
                .try_award_points("Eagles", &sam, WorkoutCategory::Field, scored_at)
                .await
                .unwrap();
        }

        let reloaded = league_with(Arc::new(JsonFileStore::new(&path))).await;
        let id = reloaded.group_id("Eagles").unwrap();
        let restored = reloaded.member(&id, &sam).unwrap();

        assert_eq!(restored.display_name, "Sam");
        assert_eq!(restored.points, 5);
        assert_eq!(restored.last_update, datetime!(2026-10-16 15:05 UTC));
        assert_eq!(reloaded.member(&id, &alex).unwrap().points, 0);

        let still_cooling = reloaded
            .try_award_points(
                "Eagles",
                &sam,
                WorkoutCategory::Gym,
                scored_at + Duration::minutes(30),
            )
            .await
            .unwrap();
        assert!(matches!(still_cooling, AwardOutcome::RateLimited { .. }));
    }

    #[tokio::test]
    async fn orphaned_ledger_entries_are_dropped_on_load() {
        let mut document = LeagueDocument::default();
        document
            .scores
            .insert(GroupId::from("ghost"), HashMap::new());
        document
            .groups
            .insert("Eagles".into(), GroupId::from(-100123_i64));

        let league = league_with(Arc::new(MemoryStore::with_document(document))).await;

        assert!(league.snapshot(&GroupId::from("ghost")).is_empty());
        assert_eq!(league.leaderboard("Eagles"), Some(Vec::new()));
        assert!(!league.document().scores.contains_key(&GroupId::from("ghost")));
    }
}
