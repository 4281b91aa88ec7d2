use crate::monitoring::metrics::{RPC_REQUESTS_TOTAL, RPC_REQUEST_LATENCY};
use crate::rpc::account_source::{AccountSource, MemcmpFilter};
use anyhow::{Context, Result};
use async_trait::async_trait;
use solana_account_decoder::UiAccountEncoding;
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::time::sleep;
use tracing::warn;

/// Un "wrapper" autour du RpcClient de Solana qui ajoute une logique de
/// ré-essai automatique pour les appels RPC qui échouent à cause d'erreurs réseau temporaires.
#[derive(Clone)]
pub struct ResilientRpcClient {
    client: Arc<RpcClient>,
    max_retries: u8,
    delay_ms: u64,
}

impl ResilientRpcClient {
    /// Construit un nouveau client RPC résilient.
    pub fn new(rpc_url: String, max_retries: u8, delay_ms: u64) -> Self {
        Self {
            client: Arc::new(RpcClient::new(rpc_url)),
            max_retries,
            delay_ms,
        }
    }

    /// Méthode "passe-plat" pour accéder à la configuration de commitment du client sous-jacent.
    pub fn commitment(&self) -> CommitmentConfig {
        self.client.commitment()
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Détermine si une erreur du client est temporaire et si une nouvelle tentative doit être effectuée.
    fn is_retryable(error: &ClientError) -> bool {
        matches!(
            error.kind,
            ClientErrorKind::Reqwest(_) | ClientErrorKind::RpcError(_) | ClientErrorKind::Io(_)
        )
    }

    /// Exécute `op` jusqu'à `max_retries + 1` fois tant que l'erreur est temporaire.
    async fn with_retries<T, F, Fut>(&self, method: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let timer = RPC_REQUEST_LATENCY.with_label_values(&[method]).start_timer();
        let mut attempt = 0;
        let outcome = loop {
            match op().await {
                Ok(value) => break Ok(value),
                Err(e) if Self::is_retryable(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(method, attempt, error = %e, "[RPC] Erreur temporaire, nouvelle tentative");
                    sleep(Duration::from_millis(self.delay_ms)).await;
                }
                Err(e) => break Err(e),
            }
        };
        timer.observe_duration();

        let status = if outcome.is_ok() { "success" } else { "failure" };
        RPC_REQUESTS_TOTAL.with_label_values(&[method, status]).inc();
        outcome.with_context(|| format!("Échec final de {}", method))
    }

    /// Récupère un compte complet.
    pub async fn get_account(&self, pubkey: &Pubkey) -> Result<Account> {
        self.with_retries("get_account", move || self.client.get_account(pubkey))
            .await
            .with_context(|| format!("Compte {}", pubkey))
    }

    /// Récupère plusieurs comptes.
    pub async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        self.with_retries("get_multiple_accounts", move || self.client.get_multiple_accounts(pubkeys))
            .await
    }

    pub async fn get_program_accounts_with_config(
        &self,
        program_id: &Pubkey,
        config: RpcProgramAccountsConfig,
    ) -> Result<Vec<(Pubkey, Account)>> {
        self.with_retries("get_program_accounts", move || {
            self.client.get_program_accounts_with_config(program_id, config.clone())
        })
        .await
        .with_context(|| format!("Programme {}", program_id))
    }
}

#[async_trait]
impl AccountSource for ResilientRpcClient {
    async fn get_multiple_accounts(&self, pubkeys: &[Pubkey]) -> Result<Vec<Option<Account>>> {
        ResilientRpcClient::get_multiple_accounts(self, pubkeys).await
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<(Pubkey, Account)>> {
        let rpc_filters = filters
            .iter()
            .map(|f| RpcFilterType::Memcmp(Memcmp::new_raw_bytes(f.offset, f.bytes.clone())))
            .collect();

        let config = RpcProgramAccountsConfig {
            filters: Some(rpc_filters),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: None,
                commitment: None,
                min_context_slot: None,
            },
            with_context: Some(false),
            sort_results: None,
        };
        self.get_program_accounts_with_config(program_id, config).await
    }
}
