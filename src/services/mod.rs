// Service exports
pub mod cache;
pub mod discovery;
pub mod lifecycle;
pub mod memory;
pub mod notifications;
pub mod postgres;
pub mod profiles;
pub mod safety;
pub mod store;
pub mod swipes;

pub use cache::{CacheKey, CacheManager};
pub use discovery::{DiscoveryOptions, DiscoveryService};
pub use lifecycle::{LifecyclePolicy, MatchLifecycle};
pub use memory::MemoryStore;
pub use notifications::{LogNotifier, MatchNotifier, RecordingNotifier, WebhookNotifier};
pub use postgres::PostgresStore;
pub use profiles::ProfileService;
pub use safety::{HttpSafetyClient, RelationKind, SafetyProvider, SafetyRelation, StaticSafety};
pub use store::{MatchStore, ProfileStore, Store, StoreHealth, SwipeStore};
pub use swipes::{SwipeInput, SwipeOutcome, SwipeRecorder};
