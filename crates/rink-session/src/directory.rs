//! Account and progression storage behind the unary RPC surface.
//!
//! The hub never talks to a database directly; it calls a [`Directory`]
//! implementation injected at construction. This is the seam where a
//! deployment wires in Postgres, Redis, or whatever the operator runs.
//! [`MemoryDirectory`] is the in-process implementation used in tests
//! and local development.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use rand::Rng;
use rink_protocol::{PlayerId, SkinKind};

use crate::{DirectoryError, MatchRecord, PlayerProfile, RankEntry, SkinSet};

/// How many rows a ranking fetch returns.
const RANKING_TOP_N: usize = 10;

/// Starting cash balance for a freshly created account.
const STARTING_CASH: i64 = 1000;

/// Pluggable account/progression store.
///
/// Implementations must be cheap to call concurrently; every connection
/// task holds a reference and may call in parallel.
///
/// # Example
///
/// ```ignore
/// struct PgDirectory { pool: sqlx::PgPool }
///
/// impl Directory for PgDirectory {
///     async fn authenticate(
///         &self,
///         username: &str,
///         password: &str,
///     ) -> Result<PlayerProfile, DirectoryError> {
///         // SELECT ... WHERE username = $1, verify the hash, etc.
///         # unimplemented!()
///     }
///     // ...
/// }
/// ```
pub trait Directory: Send + Sync + 'static {
    /// Creates a new account and returns its profile. `name` is the
    /// display name; `username` is the login handle.
    ///
    /// # Errors
    /// - [`DirectoryError::Auth`] — username already taken
    fn create_account(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<PlayerProfile, DirectoryError>> + Send;

    /// Verifies credentials and returns the matching profile.
    ///
    /// # Errors
    /// - [`DirectoryError::Auth`] — unknown username or wrong password
    fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<PlayerProfile, DirectoryError>> + Send;

    /// Persists the outcome of one finished match and returns the
    /// record's assigned ID.
    fn store_record(
        &self,
        record: &MatchRecord,
    ) -> impl Future<Output = Result<String, DirectoryError>> + Send;

    /// Returns the top of the ladder, best rank first.
    fn fetch_ranking(
        &self,
    ) -> impl Future<Output = Result<Vec<RankEntry>, DirectoryError>> + Send;

    /// Overwrites a player's rank and cash with the submitted totals
    /// and returns the updated profile. The client is authoritative
    /// for progression: it reports new totals, the store keeps them.
    ///
    /// # Errors
    /// - [`DirectoryError::NotFound`] — no such player
    fn update_rank_and_cash(
        &self,
        player_id: &PlayerId,
        rank: i64,
        cash: i64,
    ) -> impl Future<Output = Result<PlayerProfile, DirectoryError>> + Send;

    /// Records a cosmetic purchase: adds one skin ID to the player's
    /// slot for `kind`. Adding a skin the player already owns is a
    /// no-op, not an error.
    ///
    /// # Errors
    /// - [`DirectoryError::NotFound`] — no such player
    fn upsert_skin(
        &self,
        player_id: &PlayerId,
        kind: SkinKind,
        skin_id: u32,
    ) -> impl Future<Output = Result<(), DirectoryError>> + Send;

    /// Returns everything a player owns, one list per slot.
    ///
    /// # Errors
    /// - [`DirectoryError::NotFound`] — no such player
    fn skins(
        &self,
        player_id: &PlayerId,
    ) -> impl Future<Output = Result<SkinSet, DirectoryError>> + Send;
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Store {
    /// username → (password, profile). Plaintext password comparison;
    /// this store exists for tests and local dev only.
    accounts: HashMap<String, (String, PlayerProfile)>,
    records: HashMap<String, MatchRecord>,
    skins: HashMap<PlayerId, SkinSet>,
}

/// In-process [`Directory`] backed by hash maps.
///
/// Loses everything on restart, which is exactly right for tests and
/// local development and exactly wrong for anything else.
#[derive(Default)]
pub struct MemoryDirectory {
    store: Mutex<Store>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of matches stored so far. Test hook.
    pub fn record_count(&self) -> usize {
        self.store.lock().unwrap().records.len()
    }

    /// 128 random bits as 32 lowercase hex chars. Used for player and
    /// record IDs alike.
    fn fresh_id() -> String {
        let mut rng = rand::rng();
        let bytes: [u8; 16] = rng.random();
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl Directory for MemoryDirectory {
    async fn create_account(
        &self,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<PlayerProfile, DirectoryError> {
        let mut store = self.store.lock().unwrap();
        if store.accounts.contains_key(username) {
            return Err(DirectoryError::Auth(format!(
                "username '{username}' is taken"
            )));
        }
        let profile = PlayerProfile {
            player_id: PlayerId::from(Self::fresh_id()),
            name: name.to_string(),
            cash: STARTING_CASH,
            rank: 0,
        };
        store.accounts.insert(
            username.to_string(),
            (password.to_string(), profile.clone()),
        );
        store
            .skins
            .insert(profile.player_id.clone(), SkinSet::default());
        Ok(profile)
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<PlayerProfile, DirectoryError> {
        let store = self.store.lock().unwrap();
        // Deliberately the same error for "no such user" and "wrong
        // password" so login attempts can't enumerate usernames.
        match store.accounts.get(username) {
            Some((stored, profile)) if stored == password => {
                Ok(profile.clone())
            }
            _ => Err(DirectoryError::Auth(
                "invalid username or password".into(),
            )),
        }
    }

    async fn store_record(
        &self,
        record: &MatchRecord,
    ) -> Result<String, DirectoryError> {
        let record_id = Self::fresh_id();
        let mut store = self.store.lock().unwrap();
        store
            .records
            .insert(record_id.clone(), record.clone());
        Ok(record_id)
    }

    async fn fetch_ranking(&self) -> Result<Vec<RankEntry>, DirectoryError> {
        let store = self.store.lock().unwrap();
        let mut entries: Vec<RankEntry> = store
            .accounts
            .values()
            .map(|(_, p)| RankEntry {
                player_id: p.player_id.clone(),
                name: p.name.clone(),
                rank: p.rank,
            })
            .collect();
        entries.sort_by(|a, b| b.rank.cmp(&a.rank));
        entries.truncate(RANKING_TOP_N);
        Ok(entries)
    }

    async fn update_rank_and_cash(
        &self,
        player_id: &PlayerId,
        rank: i64,
        cash: i64,
    ) -> Result<PlayerProfile, DirectoryError> {
        let mut store = self.store.lock().unwrap();
        let profile = store
            .accounts
            .values_mut()
            .map(|(_, p)| p)
            .find(|p| &p.player_id == player_id)
            .ok_or_else(|| DirectoryError::NotFound(player_id.clone()))?;
        profile.rank = rank;
        profile.cash = cash;
        Ok(profile.clone())
    }

    async fn upsert_skin(
        &self,
        player_id: &PlayerId,
        kind: SkinKind,
        skin_id: u32,
    ) -> Result<(), DirectoryError> {
        let mut store = self.store.lock().unwrap();
        let set = store
            .skins
            .get_mut(player_id)
            .ok_or_else(|| DirectoryError::NotFound(player_id.clone()))?;
        set.add(kind, skin_id);
        Ok(())
    }

    async fn skins(
        &self,
        player_id: &PlayerId,
    ) -> Result<SkinSet, DirectoryError> {
        self.store
            .lock()
            .unwrap()
            .skins
            .get(player_id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(player_id.clone()))
    }
}

// =========================================================================
// Tests
// =========================================================================
