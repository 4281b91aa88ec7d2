// DANS : src/state/account_cache.rs

use crate::data_pipeline::BatchFetcher;
use crate::decoders::{AccountDecoder, DecodedAccount};
use crate::monitoring::metrics::{CACHE_EVICTIONS, CACHE_HITS, CACHE_MISSES, CACHE_SIZE};
use crate::utils::unix_millis;
use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use solana_sdk::pubkey::Pubkey;
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::{debug, info};

pub const DEFAULT_CLUSTER: &str = "mainnet-beta";

#[derive(Debug, Clone)]
struct CacheEntry {
    decoded: DecodedAccount,
    inserted_at_ms: u64,
    // Départage les insertions tombées dans la même milliseconde.
    seq: u64,
}

/// Cache borné des comptes décodés, partagé via `Arc` entre les consommateurs.
///
/// C'est l'heure d'insertion, pas celle du dernier accès, qui décide de la survie
/// d'une entrée : quand la capacité est dépassée, les plus anciennes partent en premier.
/// Les comptes inexistants ne sont jamais mis en cache.
pub struct AccountCache {
    entries: RwLock<HashMap<Pubkey, CacheEntry>>,
    next_seq: AtomicU64,
    // Incrémentée à chaque vidage : un fetch lancé avant n'écrit plus rien.
    generation: AtomicU64,
    max_entries: usize,
    fetcher: ArcSwap<BatchFetcher>,
    decoder: AccountDecoder,
    cluster: ArcSwap<String>,
}

impl AccountCache {
    pub fn new(fetcher: BatchFetcher, decoder: AccountDecoder, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            generation: AtomicU64::new(0),
            max_entries: max_entries.max(1),
            fetcher: ArcSwap::from_pointee(fetcher),
            decoder,
            cluster: ArcSwap::from_pointee(DEFAULT_CLUSTER.to_string()),
        }
    }

    pub fn with_cluster(self, cluster: &str) -> Self {
        self.cluster.store(Arc::new(cluster.to_string()));
        self
    }

    pub fn cluster(&self) -> String {
        self.cluster.load().as_ref().clone()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Le fetcher du cluster courant.
    pub fn fetcher(&self) -> Arc<BatchFetcher> {
        self.fetcher.load_full()
    }

    pub fn decoder(&self) -> &AccountDecoder {
        &self.decoder
    }

    // Un verrou empoisonné ne contient qu'une HashMap cohérente : chaque entrée est remplacée d'un bloc.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<Pubkey, CacheEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Pubkey, CacheEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn contains(&self, id: &Pubkey) -> bool {
        self.read().contains_key(id)
    }

    /// Lecture seule, sans fetch.
    pub fn get(&self, id: &Pubkey) -> Option<DecodedAccount> {
        self.read().get(id).map(|entry| entry.decoded.clone())
    }

    pub fn insert(&self, id: Pubkey, decoded: DecodedAccount) {
        self.insert_at(id, decoded, unix_millis());
    }

    /// Insère avec une heure d'insertion explicite (rejeu, tests).
    pub fn insert_at(&self, id: Pubkey, decoded: DecodedAccount, inserted_at_ms: u64) {
        let mut writer = self.write();
        self.put_locked(&mut writer, id, decoded, inserted_at_ms);
        self.evict_locked(&mut writer);
    }

    // N'écrit que si aucun vidage n'a eu lieu depuis `generation`.
    fn insert_many(&self, decoded: Vec<DecodedAccount>, generation: u64) {
        if decoded.is_empty() {
            return;
        }
        let now = unix_millis();
        let mut writer = self.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(dropped = decoded.len(), "[Cache] Résultats d'un cluster précédent ignorés");
            return;
        }
        for account in decoded {
            self.put_locked(&mut writer, account.address(), account, now);
        }
        self.evict_locked(&mut writer);
    }

    fn put_locked(&self, map: &mut HashMap<Pubkey, CacheEntry>, id: Pubkey, decoded: DecodedAccount, inserted_at_ms: u64) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        // Le dernier écrit gagne.
        map.insert(id, CacheEntry { decoded, inserted_at_ms, seq });
    }

    fn evict_locked(&self, map: &mut HashMap<Pubkey, CacheEntry>) {
        if map.len() > self.max_entries {
            let excess = map.len() - self.max_entries;
            let mut by_age: Vec<(u64, u64, Pubkey)> =
                map.iter().map(|(id, entry)| (entry.inserted_at_ms, entry.seq, *id)).collect();
            by_age.sort_unstable();
            for (_, _, id) in by_age.into_iter().take(excess) {
                map.remove(&id);
            }
            CACHE_EVICTIONS.inc_by(excess as u64);
            debug!(evicted = excess, size = map.len(), "[Cache] Éviction des entrées les plus anciennes");
        }
        CACHE_SIZE.set(map.len() as i64);
    }

    pub async fn get_or_fetch(&self, id: &Pubkey) -> Result<Option<DecodedAccount>> {
        let mut found = self.get_or_fetch_many(std::slice::from_ref(id)).await?;
        Ok(found.remove(id))
    }

    /// Sert les hits depuis le cache et envoie tous les misses au fetcher en un seul appel.
    /// Les comptes introuvables sont absents de la map.
    pub async fn get_or_fetch_many(&self, ids: &[Pubkey]) -> Result<HashMap<Pubkey, DecodedAccount>> {
        // La génération est lue avant le fetcher : `on_cluster_change` installe le fetcher avant d'incrémenter.
        let generation = self.generation.load(Ordering::SeqCst);
        let fetcher = self.fetcher.load_full();
        let mut found = HashMap::with_capacity(ids.len());
        let mut misses = Vec::new();
        {
            let reader = self.read();
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(*id) {
                    continue;
                }
                match reader.get(id) {
                    Some(entry) => {
                        found.insert(*id, entry.decoded.clone());
                    }
                    None => misses.push(*id),
                }
            }
        }
        CACHE_HITS.inc_by(found.len() as u64);
        CACHE_MISSES.inc_by(misses.len() as u64);

        if misses.is_empty() {
            return Ok(found);
        }

        let fetched = fetcher
            .fetch_all(&misses)
            .await
            .with_context(|| format!("Échec du fetch de {} comptes absents du cache", misses.len()))?;
        let decoded: Vec<DecodedAccount> = fetched.into_iter().flatten().map(|raw| self.decoder.decode(raw)).collect();
        for account in &decoded {
            found.insert(account.address(), account.clone());
        }
        self.insert_many(decoded, generation);

        Ok(found)
    }

    pub fn clear(&self) {
        let mut writer = self.write();
        self.generation.fetch_add(1, Ordering::SeqCst);
        writer.clear();
        CACHE_SIZE.set(0);
    }

    /// Fin de vie explicite : le cache est vidé puis rendu.
    pub fn dispose(self) {
        self.clear();
    }

    /// À appeler quand le réseau Solana change : installe le fetcher du nouveau cluster
    /// puis vide le cache, un compte d'un autre cluster n'ayant plus de sens.
    /// Renvoie `true` si le cache a été vidé ; rien ne change si le cluster est le même.
    pub fn on_cluster_change(&self, cluster: &str, fetcher: BatchFetcher) -> bool {
        if self.cluster.load().as_str() == cluster {
            return false;
        }
        self.fetcher.store(Arc::new(fetcher));
        let previous = self.cluster.swap(Arc::new(cluster.to_string()));
        self.clear();
        info!(from = %previous, to = cluster, "[Cache] Changement de cluster, cache vidé");
        true
    }

    // --- API CONSOMMATEUR ---

    pub async fn get_account_datum(&self, id: &Pubkey) -> Result<Option<DecodedAccount>> {
        self.get_or_fetch(id).await
    }

    /// `result[i]` correspond à `ids[i]`.
    pub async fn get_account_data(&self, ids: &[Pubkey]) -> Result<Vec<Option<DecodedAccount>>> {
        let found = self.get_or_fetch_many(ids).await?;
        Ok(ids.iter().map(|id| found.get(id).cloned()).collect())
    }

    pub async fn get_account_data_by_id(&self, ids: &[Pubkey]) -> Result<HashMap<Pubkey, DecodedAccount>> {
        self.get_or_fetch_many(ids).await
    }
}
