// src/data_pipeline/fetcher.rs

use crate::decoders::RawAccount;
use crate::monitoring::metrics::FETCH_BATCHES_TOTAL;
use crate::rpc::AccountSource;
use anyhow::{Result, bail};
use futures::future::try_join_all;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Limite d'un appel `getMultipleAccounts` côté RPC Solana.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Récupère des comptes par lots, en conservant exactement la forme de l'entrée.
#[derive(Clone)]
pub struct BatchFetcher {
    source: Arc<dyn AccountSource>,
    max_batch_size: usize,
}

impl BatchFetcher {
    pub fn new(source: Arc<dyn AccountSource>, max_batch_size: usize) -> Self {
        Self {
            source,
            max_batch_size: max_batch_size.max(1),
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn source(&self) -> &Arc<dyn AccountSource> {
        &self.source
    }

    /// `result[i]` correspond toujours à `addresses[i]` ; un `None` en entrée donne un `None`
    /// en sortie sans appel réseau, un compte inexistant donne `None`.
    /// Les doublons ne sont demandés qu'une fois. L'échec d'un lot fait échouer tout l'appel.
    pub async fn fetch_many(&self, addresses: &[Option<Pubkey>]) -> Result<Vec<Option<RawAccount>>> {
        // --- ÉTAPE 1 : Dédoublonnage, dans l'ordre de première apparition ---
        let mut unique: Vec<Pubkey> = Vec::new();
        let mut position: HashMap<Pubkey, usize> = HashMap::new();
        for address in addresses.iter().flatten() {
            position.entry(*address).or_insert_with(|| {
                unique.push(*address);
                unique.len() - 1
            });
        }

        if unique.is_empty() {
            return Ok(vec![None; addresses.len()]);
        }

        // --- ÉTAPE 2 : Un appel par lot, tous les lots en parallèle ---
        let batches = unique.chunks(self.max_batch_size).map(|chunk| async move {
            FETCH_BATCHES_TOTAL.inc();
            let accounts = self.source.get_multiple_accounts(chunk).await?;
            if accounts.len() != chunk.len() {
                bail!(
                    "Réponse RPC incohérente: {} comptes demandés, {} reçus",
                    chunk.len(),
                    accounts.len()
                );
            }
            Ok::<_, anyhow::Error>(
                chunk
                    .iter()
                    .zip(accounts)
                    .map(|(address, account)| account.map(|a| RawAccount::from_account(*address, a)))
                    .collect::<Vec<_>>(),
            )
        });
        let fetched: Vec<Option<RawAccount>> = try_join_all(batches).await?.into_iter().flatten().collect();

        debug!(
            requested = addresses.len(),
            unique = unique.len(),
            found = fetched.iter().filter(|a| a.is_some()).count(),
            "[Fetcher] Lots récupérés"
        );

        // --- ÉTAPE 3 : On ré-étale les résultats sur la forme d'origine ---
        Ok(addresses
            .iter()
            .map(|address| address.and_then(|a| fetched[position[&a]].clone()))
            .collect())
    }

    /// Raccourci pour une liste sans trous.
    pub async fn fetch_all(&self, addresses: &[Pubkey]) -> Result<Vec<Option<RawAccount>>> {
        let wrapped: Vec<Option<Pubkey>> = addresses.iter().copied().map(Some).collect();
        self.fetch_many(&wrapped).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemoryAccountSource;

    #[tokio::test]
    async fn preserves_shape_with_duplicates_and_nulls() {
        let source = Arc::new(MemoryAccountSource::default());
        let (a, b, missing) = (Pubkey::new_unique(), Pubkey::new_unique(), Pubkey::new_unique());
        let owner = Pubkey::new_unique();
        source.insert(a, owner, vec![1]);
        source.insert(b, owner, vec![2]);

        let fetcher = BatchFetcher::new(source.clone(), 2);
        let input = vec![Some(a), None, Some(b), Some(a), Some(missing), None];
        let output = fetcher.fetch_many(&input).await.unwrap();

        assert_eq!(output.len(), input.len());
        assert_eq!(output[0].as_ref().map(|r| r.data.clone()), Some(vec![1]));
        assert!(output[1].is_none());
        assert_eq!(output[2].as_ref().map(|r| r.address), Some(b));
        assert_eq!(output[3].as_ref().map(|r| r.address), Some(a));
        assert!(output[4].is_none());
        assert!(output[5].is_none());

        // 3 adresses uniques, lots de 2 -> 2 appels, aucun doublon demandé.
        let batches = source.batches();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|batch| batch.len() <= 2));
        assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn all_null_input_makes_no_call() {
        let source = Arc::new(MemoryAccountSource::default());
        let fetcher = BatchFetcher::new(source.clone(), 100);
        let output = fetcher.fetch_many(&[None, None]).await.unwrap();
        assert_eq!(output, vec![None, None]);
        assert!(source.batches().is_empty());
    }

    #[tokio::test]
    async fn batch_failure_fails_the_call() {
        let source = Arc::new(MemoryAccountSource::default());
        source.fail_next_calls(1);
        let fetcher = BatchFetcher::new(source.clone(), 100);
        assert!(fetcher.fetch_all(&[Pubkey::new_unique()]).await.is_err());
    }

    #[test]
    fn batch_size_is_clamped() {
        let fetcher = BatchFetcher::new(Arc::new(MemoryAccountSource::default()), 0);
        assert_eq!(fetcher.max_batch_size(), 1);
    }
}
