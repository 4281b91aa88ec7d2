// src/test_utils.rs

// Ledger en mémoire pour les tests : enregistre chaque lot demandé et peut simuler des pannes.

use crate::rpc::{AccountSource, MemcmpFilter};
use anyhow::{Result, bail};
use async_trait::async_trait;
use solana_sdk::{account::Account, pubkey::Pubkey};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryAccountSource {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    batches: Mutex<Vec<Vec<Pubkey>>>,
    failures_left: Mutex<usize>,
}

impl MemoryAccountSource {
    pub fn insert(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        let account = Account { lamports: 1_000_000, data, owner, executable: false, rent_epoch: 0 };
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub fn remove(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    /// Chaque appel `get_multiple_accounts` reçu, dans l'ordre.
    pub fn batches(&self) -> Vec<Vec<Pubkey>> {
        self.batches.lock().unwrap().clone()
    }

    /// Toutes les adresses demandées, lots confondus.
    pub fn requested(&self) -> Vec<Pubkey> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn reset_batches(&self) {
        self.batches.lock().unwrap().clear();
    }

    pub fn fail_next_calls(&self, count: usize) {
        *self.failures_left.lock().unwrap() = count;
    }

    fn take_failure(&self) -> bool {
        let mut left = self.failures_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    }
}

#[async_trait]
impl AccountSource for MemoryAccountSource {
    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        self.batches.lock().unwrap().push(pubkeys.to_vec());
        if self.take_failure() {
            bail!("panne RPC simulée");
        }
        let accounts = self.accounts.lock().unwrap();
        Ok(pubkeys.iter().map(|p| accounts.get(p).cloned()).collect())
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Account)>> {
        if self.take_failure() {
            bail!("panne RPC simulée");
        }
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|(_, account)| &account.owner == program_id)
            .filter(|(_, account)| filters.iter().all(|f| f.matches(&account.data)))
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }
}
