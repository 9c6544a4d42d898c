//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::mpsc::UnboundedReceiver;

use profile_cache::cache::{
    CacheRecord, DurableStore, MemoryStore, MemoryVolatileStore, ProfileStore, StoreError,
};
use profile_cache::config::RefreshPolicy;
use profile_cache::profile::{
    ArenaLineup, Character, CharacterStats, DataSource, PlayerKey, Profile, ProfileService, Ship,
    SourceError,
};
use profile_cache::tasks::{RefreshJob, RefreshQueue};

// == Scripted Source ==
/// Upstream double with call counters and failure switches.
pub struct ScriptedSource {
    pub arena_update: Mutex<DateTime<Utc>>,
    pub roster: Vec<Character>,
    pub fail_arena: AtomicBool,
    pub fail_ships: AtomicBool,
    /// Characters whose detail fetch always fails
    pub broken_details: Vec<String>,
    pub arena_calls: AtomicUsize,
    pub collection_calls: AtomicUsize,
    pub ships_calls: AtomicUsize,
    pub detail_calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedSource {
    pub fn new(arena_update: DateTime<Utc>) -> Self {
        Self {
            arena_update: Mutex::new(arena_update),
            roster: roster(),
            fail_arena: AtomicBool::new(false),
            fail_ships: AtomicBool::new(false),
            broken_details: Vec::new(),
            arena_calls: AtomicUsize::new(0),
            collection_calls: AtomicUsize::new(0),
            ships_calls: AtomicUsize::new(0),
            detail_calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_broken_detail(mut self, name: &str) -> Self {
        self.broken_details.push(name.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.arena_calls.load(Ordering::SeqCst)
            + self.collection_calls.load(Ordering::SeqCst)
            + self.ships_calls.load(Ordering::SeqCst)
            + self.detail_calls.lock().unwrap().values().sum::<usize>()
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch_arena_lineup(&self, _player: &PlayerKey) -> Result<ArenaLineup, SourceError> {
        self.arena_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_arena.load(Ordering::SeqCst) {
            return Err(SourceError::Status(503));
        }
        Ok(ArenaLineup {
            lineup: vec![stats_for("Rey")],
            last_update: *self.arena_update.lock().unwrap(),
        })
    }

    async fn fetch_collection(&self, _player: &PlayerKey) -> Result<Vec<Character>, SourceError> {
        self.collection_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.roster.clone())
    }

    async fn fetch_ships(&self, _player: &PlayerKey) -> Result<Vec<Ship>, SourceError> {
        self.ships_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_ships.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("ships page changed".to_string()));
        }
        Ok(vec![Ship {
            name: "Millennium Falcon".to_string(),
            stars: 6,
            level: 85,
            power: 40_000,
        }])
    }

    async fn fetch_character_detail(
        &self,
        _player: &PlayerKey,
        character: &str,
    ) -> Result<CharacterStats, SourceError> {
        *self
            .detail_calls
            .lock()
            .unwrap()
            .entry(character.to_string())
            .or_default() += 1;
        if self.broken_details.iter().any(|name| name == character) {
            return Err(SourceError::Status(500));
        }
        Ok(stats_for(character))
    }
}

// == Flaky Durable Store ==
/// Memory store whose writes can be switched off.
#[derive(Default)]
pub struct FlakyDurable {
    pub inner: MemoryStore,
    pub fail_puts: AtomicBool,
}

#[async_trait]
impl DurableStore for FlakyDurable {
    async fn get(&self, key: &str) -> Result<Option<CacheRecord>, StoreError> {
        self.inner.get(key).await
    }

    async fn put(&self, record: &CacheRecord) -> Result<(), StoreError> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("datastore unavailable".to_string()));
        }
        self.inner.put(record).await
    }

    async fn count(&self) -> Result<usize, StoreError> {
        self.inner.count().await
    }

    async fn count_updated_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        self.inner.count_updated_before(cutoff).await
    }

    async fn oldest_update(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.inner.oldest_update().await
    }

    async fn list_updated_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CacheRecord>, StoreError> {
        self.inner.list_updated_before(cutoff, limit).await
    }
}

// == Harness ==
pub struct Harness {
    pub service: Arc<ProfileService>,
    pub durable: Arc<FlakyDurable>,
    pub volatile: MemoryVolatileStore,
    pub source: Arc<ScriptedSource>,
    pub queue: Arc<RefreshQueue>,
    pub jobs: UnboundedReceiver<RefreshJob>,
}

impl Harness {
    pub fn new(source: ScriptedSource) -> Self {
        let durable = Arc::new(FlakyDurable::default());
        let volatile = MemoryVolatileStore::new(100, Some(Duration::from_secs(3600)));
        let source = Arc::new(source);
        let (queue, jobs) = RefreshQueue::new();
        let queue = Arc::new(queue);
        let service = Arc::new(ProfileService::new(
            ProfileStore::new(durable.clone(), Some(Arc::new(volatile.clone()))),
            source.clone(),
            queue.clone(),
            &test_policy(),
        ));
        Self {
            service,
            durable,
            volatile,
            source,
            queue,
            jobs,
        }
    }

    pub async fn seed(&self, profile: &Profile) {
        let record = CacheRecord::encode(&player(), profile).unwrap();
        self.durable.inner.put(&record).await.unwrap();
    }

    pub async fn stored(&self) -> Option<CacheRecord> {
        self.durable.inner.get(player().as_str()).await.unwrap()
    }

    pub fn drain_jobs(&mut self) -> Vec<RefreshJob> {
        let mut jobs = Vec::new();
        while let Ok(job) = self.jobs.try_recv() {
            jobs.push(job);
        }
        jobs
    }
}

pub fn test_policy() -> RefreshPolicy {
    RefreshPolicy {
        retry_backoff: Duration::from_millis(5),
        fetch_deadline: Duration::from_secs(10),
        workers: 4,
        ..RefreshPolicy::default()
    }
}

pub fn player() -> PlayerKey {
    PlayerKey::parse("ronoaldo").unwrap()
}

pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - TimeDelta::hours(hours)
}

/// Seven active characters and two not yet unlocked.
pub fn roster() -> Vec<Character> {
    let active = ["Rey", "Finn", "Poe", "BB-8", "Chewbacca", "Han Solo", "Leia"];
    let locked = ["Jyn Erso", "K-2SO"];
    active
        .iter()
        .map(|name| character(name, 7))
        .chain(locked.iter().map(|name| character(name, 0)))
        .collect()
}

pub fn active_count() -> usize {
    roster().iter().filter(|c| c.is_active()).count()
}

pub fn character(name: &str, stars: i32) -> Character {
    Character {
        name: name.to_string(),
        stars,
        level: 85,
        gear_level: 12,
        power: 20_000,
    }
}

pub fn stats_for(name: &str) -> CharacterStats {
    CharacterStats {
        name: name.to_string(),
        stars: 7,
        level: 85,
        gear_level: 12,
        power: 20_000,
        health: 40_000,
        protection: 50_000,
        speed: 180,
        physical_damage: 3_000,
        special_damage: 2_500,
        potency: 0.65,
        tenacity: 0.45,
    }
}

pub fn cached_profile(last_update: DateTime<Utc>) -> Profile {
    Profile {
        last_update: Some(last_update),
        collection: vec![character("Rey", 5)],
        ships: Vec::new(),
        arena: Vec::new(),
        stats: vec![stats_for("Rey")],
    }
}
