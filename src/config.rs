use crate::programs::ProgramIds;
use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

fn default_cluster() -> String { "mainnet-beta".to_string() }
fn default_rpc_max_retries() -> u8 { 3 }
fn default_rpc_retry_delay_ms() -> u64 { 500 }
fn default_fetch_batch_size() -> usize { 100 }
fn default_cache_max_entries() -> usize { 10_000 }
fn default_metadata_timeout_ms() -> u64 { 5_000 }

fn default_token_manager_program_id() -> String { "mgr99QFMYByTqGPWmNqunV7vBLmWWXdSrHUfV8Jf3JM".to_string() }
fn default_time_invalidator_program_id() -> String { "tmeEDp1RgoDtZFtx6qod3HkbQmv9LMe36uqKVvsLTDE".to_string() }
fn default_use_invalidator_program_id() -> String { "useZ65tbyvWpdYCLDJaegGK34Lnsi8S3jZdwx8122qp".to_string() }
fn default_paid_claim_approver_program_id() -> String { "pcaBwhJ1YHp7UDA7HASpQsRUmUNwzgYaLQto2kSj1fR".to_string() }
fn default_token_metadata_program_id() -> String { "metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bmuNh5es".to_string() }

/// Configuration chargée depuis l'environnement (et un éventuel fichier `.env`).
/// Chaque champ correspond à la variable d'environnement du même nom en majuscules.
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub solana_rpc_url: String,
    #[serde(default = "default_cluster")]
    pub cluster: String,
    #[serde(default = "default_rpc_max_retries")]
    pub rpc_max_retries: u8,
    #[serde(default = "default_rpc_retry_delay_ms")]
    pub rpc_retry_delay_ms: u64,
    #[serde(default = "default_fetch_batch_size")]
    pub fetch_batch_size: usize,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    #[serde(default = "default_metadata_timeout_ms")]
    pub metadata_timeout_ms: u64,
    #[serde(default)]
    pub show_unknown_invalidators: bool,

    // --- Programs (surchargeables pour devnet / localnet) ---
    #[serde(default = "default_token_manager_program_id")]
    pub token_manager_program_id: String,
    #[serde(default = "default_time_invalidator_program_id")]
    pub time_invalidator_program_id: String,
    #[serde(default = "default_use_invalidator_program_id")]
    pub use_invalidator_program_id: String,
    #[serde(default = "default_paid_claim_approver_program_id")]
    pub paid_claim_approver_program_id: String,
    #[serde(default = "default_token_metadata_program_id")]
    pub token_metadata_program_id: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()?;
        Ok(config)
    }

    /// Parse les identifiants de programmes configurés.
    pub fn program_ids(&self) -> Result<ProgramIds> {
        Ok(ProgramIds {
            token_manager: parse_program_id("TOKEN_MANAGER_PROGRAM_ID", &self.token_manager_program_id)?,
            time_invalidator: parse_program_id("TIME_INVALIDATOR_PROGRAM_ID", &self.time_invalidator_program_id)?,
            use_invalidator: parse_program_id("USE_INVALIDATOR_PROGRAM_ID", &self.use_invalidator_program_id)?,
            paid_claim_approver: parse_program_id("PAID_CLAIM_APPROVER_PROGRAM_ID", &self.paid_claim_approver_program_id)?,
            token_metadata: parse_program_id("TOKEN_METADATA_PROGRAM_ID", &self.token_metadata_program_id)?,
        })
    }
}

fn parse_program_id(var: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("{} invalide: '{}'", var, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            solana_rpc_url: "http://localhost:8899".to_string(),
            cluster: default_cluster(),
            rpc_max_retries: default_rpc_max_retries(),
            rpc_retry_delay_ms: default_rpc_retry_delay_ms(),
            fetch_batch_size: default_fetch_batch_size(),
            cache_max_entries: default_cache_max_entries(),
            metadata_timeout_ms: default_metadata_timeout_ms(),
            show_unknown_invalidators: false,
            token_manager_program_id: Pubkey::new_unique().to_string(),
            time_invalidator_program_id: Pubkey::new_unique().to_string(),
            use_invalidator_program_id: Pubkey::new_unique().to_string(),
            paid_claim_approver_program_id: Pubkey::new_unique().to_string(),
            token_metadata_program_id: Pubkey::new_unique().to_string(),
        }
    }

    #[test]
    fn program_ids_are_parsed_from_overrides() {
        let config = base_config();
        let ids = config.program_ids().unwrap();
        assert_eq!(ids.token_manager.to_string(), config.token_manager_program_id);
        assert_eq!(ids.token_metadata.to_string(), config.token_metadata_program_id);
    }

    #[test]
    fn invalid_program_id_is_reported() {
        let mut config = base_config();
        config.use_invalidator_program_id = "pas-une-adresse".to_string();
        let err = config.program_ids().unwrap_err();
        assert!(err.to_string().contains("USE_INVALIDATOR_PROGRAM_ID"));
    }
}
