// src/rpc/account_source.rs

use anyhow::Result;
use async_trait::async_trait;
use solana_sdk::{account::Account, pubkey::Pubkey};

/// Filtre "memcmp" : les octets `bytes` doivent apparaître à `offset` dans les données du compte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self { offset, bytes: bytes.into() }
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len()) == Some(self.bytes.as_slice())
    }
}

/// Le point d'accès au ledger. Le fetcher et le scanner ne parlent qu'à ce trait,
/// ce qui permet de brancher le client RPC réel ou une source en mémoire.
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Un seul appel `getMultipleAccounts`. Le résultat est aligné sur `pubkeys`,
    /// `None` pour un compte qui n'existe pas.
    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>>;

    /// Tous les comptes d'un programme qui satisfont chacun des filtres.
    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Account)>>;
}
