// Integration tests for the discovery, swipe and match lifecycle services

use chrono::{Duration, TimeZone, Utc};
use lume_match::clock::{Clock, ManualClock};
use lume_match::core::{Matcher, QuotaPolicy};
use lume_match::models::{Coordinate, LookingFor, MatchStatus, MeetReadiness, UserProfile};
use lume_match::services::{
    DiscoveryOptions, DiscoveryService, LifecyclePolicy, MatchLifecycle, MemoryStore,
    ProfileStore, RecordingNotifier, RelationKind, StaticSafety, SwipeInput, SwipeRecorder,
};
use lume_match::LumeError;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};

struct Harness {
    store: Arc<MemoryStore>,
    clock: Arc<ManualClock>,
    safety: Arc<StaticSafety>,
    notifier: Arc<RecordingNotifier>,
    discovery: DiscoveryService,
    swipes: SwipeRecorder,
    lifecycle: Arc<MatchLifecycle>,
}

impl Harness {
    async fn new(profiles: Vec<UserProfile>) -> Self {
        let store = Arc::new(MemoryStore::with_profiles(profiles).await.unwrap());
        let clock = Arc::new(ManualClock::new(start()));
        let safety = Arc::new(StaticSafety::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let lifecycle = Arc::new(MatchLifecycle::new(
            store.clone(),
            store.clone(),
            notifier.clone(),
            clock.clone(),
            LifecyclePolicy::default(),
        ));
        let discovery = DiscoveryService::new(
            store.clone(),
            store.clone(),
            safety.clone(),
            Matcher::with_default_weights(),
            QuotaPolicy::default(),
            clock.clone(),
        );
        let swipes = SwipeRecorder::new(
            store.clone(),
            store.clone(),
            lifecycle.clone(),
            QuotaPolicy::default(),
            clock.clone(),
        );

        Self {
            store,
            clock,
            safety,
            notifier,
            discovery,
            swipes,
            lifecycle,
        }
    }

    async fn like(&self, from: &str, to: &str) -> lume_match::Result<lume_match::services::SwipeOutcome> {
        self.swipes
            .record_swipe(
                from,
                SwipeInput {
                    swiped_id: to.to_string(),
                    is_like: true,
                    is_super_like: false,
                    meetup_preference: None,
                },
            )
            .await
    }

    fn clock_now(&self) -> chrono::DateTime<Utc> {
        self.clock.now()
    }

    async fn matched_pair(&self, a: &str, b: &str) -> lume_match::Match {
        assert_ok!(self.like(a, b).await);
        let outcome = assert_ok!(self.like(b, a).await);
        outcome.matched.expect("mutual like should match")
    }
}

fn start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 23, 0, 0).unwrap()
}

fn create_test_profile(id: &str, gender: &str, interested_in: &str, lat: f64) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: format!("User {}", id),
        age: 30,
        gender: gender.to_string(),
        sexual_orientation: None,
        interested_in_genders: [interested_in.to_string()].into_iter().collect(),
        location: Some(Coordinate::new(lat, -74.0)),
        age_range_min: 25,
        age_range_max: 35,
        max_distance: 50,
        deal_breakers: Default::default(),
        looking_for: LookingFor::Relationship,
        lifestyle: Default::default(),
        values: Default::default(),
        meet_readiness: MeetReadiness::Flexible,
        interests: ["hiking".to_string()].into_iter().collect(),
        is_premium: false,
        daily_swipes_used: 0,
        quota_window_start: start(),
        created_at: start(),
    }
}

fn premium(mut profile: UserProfile) -> UserProfile {
    profile.is_premium = true;
    profile
}

fn community() -> Vec<UserProfile> {
    vec![
        create_test_profile("alice", "woman", "man", 40.00),
        create_test_profile("bob", "man", "woman", 40.005),
        create_test_profile("carol", "woman", "man", 40.02),
        create_test_profile("dana", "woman", "man", 40.05),
        premium(create_test_profile("erin", "woman", "man", 40.03)),
        premium(create_test_profile("frank", "man", "woman", 40.04)),
    ]
}

#[tokio::test]
async fn test_discovery_ranks_and_excludes() {
    let h = Harness::new(community()).await;

    let page = assert_ok!(h.discovery.discover("bob", DiscoveryOptions::default()).await);
    let ids: Vec<&str> = page.candidates.iter().map(|c| c.profile.id.as_str()).collect();

    assert!(!ids.contains(&"bob"));
    assert!(!ids.contains(&"frank"));
    assert_eq!(ids.len(), 4);
    // Closer candidates outscore farther ones when everything else is equal
    assert_eq!(ids[0], "alice");
    assert_eq!(page.remaining_views, Some(15));
    assert!(page.quota_resets_at.is_some());
}

#[tokio::test]
async fn test_discovery_unknown_requester() {
    let h = Harness::new(community()).await;
    let result = h.discovery.discover("nobody", DiscoveryOptions::default()).await;
    assert!(matches!(result, Err(LumeError::NotFound(_))));
}

#[tokio::test]
async fn test_swiped_candidates_disappear_from_discovery() {
    let h = Harness::new(community()).await;
    assert_ok!(h.like("bob", "alice").await);

    let page = assert_ok!(h.discovery.discover("bob", DiscoveryOptions::default()).await);
    assert!(page.candidates.iter().all(|c| c.profile.id != "alice"));
    assert_eq!(page.remaining_views, Some(14));
}

#[tokio::test]
async fn test_ghosting_hides_both_directions() {
    let h = Harness::new(community()).await;
    h.safety.record("alice", "bob", RelationKind::Ghost).await;

    let bob_page = assert_ok!(h.discovery.discover("bob", DiscoveryOptions::default()).await);
    assert!(bob_page.candidates.iter().all(|c| c.profile.id != "alice"));

    let alice_page = assert_ok!(h.discovery.discover("alice", DiscoveryOptions::default()).await);
    assert!(alice_page.candidates.iter().all(|c| c.profile.id != "bob"));
}

#[tokio::test]
async fn test_free_user_at_limit_gets_quota_exceeded() {
    let mut bob = create_test_profile("bob", "man", "woman", 40.01);
    bob.daily_swipes_used = 15;
    let h = Harness::new(vec![bob, create_test_profile("alice", "woman", "man", 40.0)]).await;

    let err = assert_err!(h.discovery.discover("bob", DiscoveryOptions::default()).await);
    match err {
        LumeError::QuotaExceeded { resets_at } => assert_eq!(resets_at, start() + Duration::hours(24)),
        other => panic!("expected QuotaExceeded, got {:?}", other),
    }

    // Quota can be bypassed explicitly
    let opts = DiscoveryOptions {
        respect_quota: false,
        ..DiscoveryOptions::default()
    };
    assert_ok!(h.discovery.discover("bob", opts).await);
}

#[tokio::test]
async fn test_quota_window_restarts_lazily() {
    let mut bob = create_test_profile("bob", "man", "woman", 40.01);
    bob.daily_swipes_used = 15;
    let h = Harness::new(vec![bob, create_test_profile("alice", "woman", "man", 40.0)]).await;

    h.clock.advance(Duration::hours(23) + Duration::minutes(59) + Duration::seconds(59));
    assert_err!(h.discovery.discover("bob", DiscoveryOptions::default()).await);

    h.clock.advance(Duration::seconds(2));
    let page = assert_ok!(h.discovery.discover("bob", DiscoveryOptions::default()).await);
    assert_eq!(page.remaining_views, Some(15));

    let stored = h.store.get_profile("bob").await.unwrap().unwrap();
    assert_eq!(stored.daily_swipes_used, 0);
    assert_eq!(stored.quota_window_start, h.clock_now());
}

#[tokio::test]
async fn test_premium_is_never_quota_limited() {
    let mut frank = premium(create_test_profile("frank", "man", "woman", 40.04));
    frank.daily_swipes_used = 500;
    let h = Harness::new(vec![frank, create_test_profile("alice", "woman", "man", 40.0)]).await;

    let page = assert_ok!(h.discovery.discover("frank", DiscoveryOptions::default()).await);
    assert_eq!(page.remaining_views, None);
    assert_eq!(page.quota_resets_at, None);
}

#[tokio::test]
async fn test_premium_timeline_annotation() {
    let mut alice = create_test_profile("alice", "woman", "man", 40.00);
    alice.meet_readiness = MeetReadiness::Within48h;
    let h = Harness::new(vec![
        alice,
        premium(create_test_profile("frank", "man", "woman", 40.04)),
        create_test_profile("bob", "man", "woman", 40.01),
    ])
    .await;

    let opts = DiscoveryOptions {
        meet_readiness: Some(MeetReadiness::Within48h),
        ..DiscoveryOptions::default()
    };

    let premium_page = assert_ok!(h.discovery.discover("frank", opts).await);
    assert_eq!(premium_page.candidates[0].timeline_alignment, Some(100));

    // Free users get no timeline annotation even when they ask
    let free_page = assert_ok!(h.discovery.discover("bob", opts).await);
    assert_eq!(free_page.candidates[0].timeline_alignment, None);
}

#[tokio::test]
async fn test_mutual_like_creates_single_match() {
    let h = Harness::new(community()).await;

    let first = assert_ok!(h.like("alice", "bob").await);
    assert!(first.matched.is_none());

    let second = assert_ok!(h.like("bob", "alice").await);
    let matched = second.matched.expect("mutual like should match");

    assert_eq!(matched.expires_at, matched.created_at + Duration::hours(72));
    assert!(!matched.is_extended);
    assert!(!matched.is_frozen);
    assert_eq!((matched.user1_id.as_str(), matched.user2_id.as_str()), ("alice", "bob"));
    assert_eq!(h.store.match_count().await, 1);
    assert_eq!(h.notifier.events().len(), 1);
    assert_eq!(h.notifier.events()[0].match_id, matched.id);
}

#[tokio::test]
async fn test_match_creation_is_idempotent() {
    let h = Harness::new(community()).await;
    let original = h.matched_pair("alice", "bob").await;

    let again = assert_ok!(h.lifecycle.create_match("bob", "alice").await);
    assert_eq!(again.id, original.id);
    assert_eq!(h.store.match_count().await, 1);
    assert_eq!(h.notifier.events().len(), 1);
}

#[tokio::test]
async fn test_swipe_uniqueness() {
    let h = Harness::new(community()).await;
    assert_ok!(h.like("bob", "alice").await);

    let err = assert_err!(h.like("bob", "alice").await);
    assert!(matches!(err, LumeError::Conflict(_)));
    assert_eq!(h.store.swipe_count().await, 1);

    // The rejected duplicate did not consume a view
    let bob = h.store.get_profile("bob").await.unwrap().unwrap();
    assert_eq!(bob.daily_swipes_used, 1);
}

#[tokio::test]
async fn test_swipe_validation() {
    let h = Harness::new(community()).await;

    let err = assert_err!(h.like("bob", "bob").await);
    assert!(matches!(err, LumeError::Validation(_)));

    let err = assert_err!(h.like("bob", "ghost").await);
    assert!(matches!(err, LumeError::NotFound(_)));
}

#[tokio::test]
async fn test_super_like_counts_as_like() {
    let h = Harness::new(community()).await;
    assert_ok!(h.like("alice", "bob").await);

    let outcome = assert_ok!(
        h.swipes
            .record_swipe(
                "bob",
                SwipeInput {
                    swiped_id: "alice".to_string(),
                    is_like: false,
                    is_super_like: true,
                    meetup_preference: None,
                },
            )
            .await
    );
    assert!(outcome.swipe.is_like);
    assert!(outcome.matched.is_some());
}

#[tokio::test]
async fn test_pass_does_not_match() {
    let h = Harness::new(community()).await;
    assert_ok!(h.like("alice", "bob").await);

    let outcome = assert_ok!(
        h.swipes
            .record_swipe(
                "bob",
                SwipeInput {
                    swiped_id: "alice".to_string(),
                    is_like: false,
                    is_super_like: false,
                    meetup_preference: None,
                },
            )
            .await
    );
    assert!(outcome.matched.is_none());
    assert_eq!(h.store.match_count().await, 0);
}

#[tokio::test]
async fn test_free_user_cannot_extend() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("alice", "bob").await;

    let err = assert_err!(h.lifecycle.extend_match(&m.id, "bob").await);
    assert!(matches!(err, LumeError::PremiumRequired(_)));

    let views = assert_ok!(h.lifecycle.matches_for_user("bob").await);
    assert!(!views[0].record.is_extended);
    assert_eq!(views[0].record.expires_at, m.expires_at);
}

#[tokio::test]
async fn test_premium_extends_once() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("erin", "frank").await;

    let extended = assert_ok!(h.lifecycle.extend_match(&m.id, "frank").await);
    assert!(extended.is_extended);
    assert_eq!(extended.expires_at, m.expires_at + Duration::hours(24));

    let err = assert_err!(h.lifecycle.extend_match(&m.id, "erin").await);
    assert!(matches!(err, LumeError::Conflict(_)));

    let views = assert_ok!(h.lifecycle.matches_for_user("erin").await);
    assert_eq!(views[0].record.expires_at, m.expires_at + Duration::hours(24));
}

#[tokio::test]
async fn test_concurrent_extend_only_one_wins() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("erin", "frank").await;

    let (a, b) = tokio::join!(
        h.lifecycle.extend_match(&m.id, "erin"),
        h.lifecycle.extend_match(&m.id, "frank"),
    );
    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);

    let views = assert_ok!(h.lifecycle.matches_for_user("erin").await);
    assert_eq!(views[0].record.expires_at, m.expires_at + Duration::hours(24));
}

#[tokio::test]
async fn test_non_participant_is_rejected() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("alice", "bob").await;

    let err = assert_err!(h.lifecycle.freeze_match(&m.id, "frank").await);
    assert!(matches!(err, LumeError::Unauthorized(_)));

    let err = assert_err!(h.lifecycle.mark_met_in_person(&m.id, "carol").await);
    assert!(matches!(err, LumeError::Unauthorized(_)));

    let err = assert_err!(h.lifecycle.extend_match("missing", "alice").await);
    assert!(matches!(err, LumeError::NotFound(_)));
}

#[tokio::test]
async fn test_match_expires_after_ttl() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("alice", "bob").await;

    h.clock.advance(Duration::hours(72) - Duration::seconds(1));
    let views = assert_ok!(h.lifecycle.matches_for_user("alice").await);
    assert_eq!(views[0].status, MatchStatus::Active);

    h.clock.advance(Duration::seconds(1));
    let views = assert_ok!(h.lifecycle.matches_for_user("alice").await);
    assert_eq!(views[0].status, MatchStatus::Expired);
    assert!(!views[0].is_active);
    assert_eq!(views[0].other_user_id, "bob");
    assert_eq!(views[0].record.id, m.id);
}

#[tokio::test]
async fn test_freeze_pauses_expiry() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("erin", "frank").await;

    h.clock.advance(Duration::hours(70));
    let frozen = assert_ok!(h.lifecycle.freeze_match(&m.id, "erin").await);
    assert!(frozen.is_frozen);

    // Repeat freeze is a no-op
    let again = assert_ok!(h.lifecycle.freeze_match(&m.id, "frank").await);
    assert_eq!(again.frozen_at, frozen.frozen_at);

    h.clock.advance(Duration::hours(100));
    let views = assert_ok!(h.lifecycle.matches_for_user("erin").await);
    assert_eq!(views[0].status, MatchStatus::Frozen);
    assert!(views[0].is_active);

    let thawed = assert_ok!(h.lifecycle.unfreeze_match(&m.id, "frank").await);
    assert!(!thawed.is_frozen);
    assert_eq!(thawed.expires_at, m.expires_at + Duration::hours(100));

    let views = assert_ok!(h.lifecycle.matches_for_user("erin").await);
    assert_eq!(views[0].status, MatchStatus::Active);
}

#[tokio::test]
async fn test_free_user_cannot_freeze() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("alice", "bob").await;

    let err = assert_err!(h.lifecycle.freeze_match(&m.id, "alice").await);
    assert!(matches!(err, LumeError::PremiumRequired(_)));
}

#[tokio::test]
async fn test_confirm_meetup() {
    let h = Harness::new(community()).await;
    let m = h.matched_pair("alice", "bob").await;

    let past = start() - Duration::hours(1);
    let err = assert_err!(
        h.lifecycle
            .confirm_meetup(&m.id, "alice", past, "Cafe".to_string())
            .await
    );
    assert!(matches!(err, LumeError::Validation(_)));

    let when = start() + Duration::days(2);
    let confirmed = assert_ok!(
        h.lifecycle
            .confirm_meetup(&m.id, "alice", when, "Blue Bottle, 5th Ave".to_string())
            .await
    );
    assert!(confirmed.meetup_confirmed);
    assert_eq!(confirmed.meetup_time, Some(when));

    let views = assert_ok!(h.lifecycle.matches_for_user("bob").await);
    assert_eq!(views[0].status, MatchStatus::MeetupConfirmed);
    assert!(!views[0].is_active);

    let met = assert_ok!(h.lifecycle.mark_met_in_person(&m.id, "bob").await);
    assert!(met.has_met_in_person);
}

#[tokio::test]
async fn test_user_matches_newest_first() {
    let h = Harness::new(community()).await;
    let first = h.matched_pair("bob", "alice").await;
    h.clock.advance(Duration::minutes(5));
    let second = h.matched_pair("bob", "carol").await;

    let views = assert_ok!(h.lifecycle.matches_for_user("bob").await);
    let ids: Vec<&str> = views.iter().map(|v| v.record.id.as_str()).collect();
    assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
}
