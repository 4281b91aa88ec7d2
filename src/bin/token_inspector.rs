// src/bin/token_inspector.rs

use anyhow::{Context, Result, anyhow, bail};
use rental_resolver::{
    config::Config,
    data_pipeline::{BatchFetcher, OffchainMetadataClient},
    decoders::{AccountDecoder, cardinal::TokenManagerState},
    filtering::EligibilityFilter,
    monitoring::{logging::setup_logging, metrics},
    rpc::ResilientRpcClient,
    state::AccountCache,
    token_data::{InvalidatorPolicy, TokenData, TokenDataResolver},
};
use solana_sdk::pubkey::Pubkey;
use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};
use tracing::info;

const USAGE: &str = "usage: token_inspector [--issuer <PUBKEY>] [--state <initialized|issued|claimed|invalidated>] \
[--mint <PUBKEY>]... [--eligibility <FICHIER.json>] [--metrics] [TOKEN_MANAGER]...";

#[derive(Default)]
struct Args {
    token_managers: Vec<Pubkey>,
    mints: Vec<Pubkey>,
    issuer: Option<Pubkey>,
    state: Option<TokenManagerState>,
    eligibility: Option<PathBuf>,
    print_metrics: bool,
}

fn parse_pubkey(value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).with_context(|| format!("Adresse invalide: '{}'", value))
}

fn parse_state(value: &str) -> Result<TokenManagerState> {
    match value.to_ascii_lowercase().as_str() {
        "initialized" => Ok(TokenManagerState::Initialized),
        "issued" => Ok(TokenManagerState::Issued),
        "claimed" => Ok(TokenManagerState::Claimed),
        "invalidated" => Ok(TokenManagerState::Invalidated),
        other => Err(anyhow!("État inconnu: '{}'", other)),
    }
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = env::args().skip(1);
    while let Some(arg) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("Valeur manquante pour {}\n{}", arg, USAGE));
        match arg.as_str() {
            "--issuer" => args.issuer = Some(parse_pubkey(&value()?)?),
            "--state" => args.state = Some(parse_state(&value()?)?),
            "--mint" => args.mints.push(parse_pubkey(&value()?)?),
            "--eligibility" => args.eligibility = Some(PathBuf::from(value()?)),
            "--metrics" => args.print_metrics = true,
            "-h" | "--help" => bail!(USAGE),
            _ => args.token_managers.push(parse_pubkey(&arg)?),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging();
    let args = parse_args()?;

    // 1. Configuration et services
    let config = Config::load()?;
    let programs = config.program_ids()?;
    let rpc_client = Arc::new(ResilientRpcClient::new(
        config.solana_rpc_url.clone(),
        config.rpc_max_retries,
        config.rpc_retry_delay_ms,
    ));
    let fetcher = BatchFetcher::new(rpc_client, config.fetch_batch_size);
    let cache = Arc::new(
        AccountCache::new(fetcher, AccountDecoder::new(&programs), config.cache_max_entries)
            .with_cluster(&config.cluster),
    );
    let metadata_client = OffchainMetadataClient::new(Duration::from_millis(config.metadata_timeout_ms))?;
    let policy = InvalidatorPolicy {
        show_unknown_invalidators: config.show_unknown_invalidators,
        ..Default::default()
    };
    let resolver = TokenDataResolver::new(cache, programs, metadata_client, policy);

    // 2. Les token managers à résoudre : arguments, mints, ou scan par émetteur/état
    let mut ids = args.token_managers.clone();
    for mint in &args.mints {
        ids.push(rental_resolver::pda::find_token_manager_address(mint, &programs));
    }
    if args.issuer.is_some() || args.state.is_some() {
        ids.extend(resolver.find_token_managers(args.issuer.as_ref(), args.state).await?);
    }
    if ids.is_empty() {
        bail!(USAGE);
    }
    info!(count = ids.len(), cluster = %config.cluster, "[Inspector] Résolution des token managers");

    // 3. Résolution puis filtre d'éligibilité éventuel
    let token_datas = resolver.get_token_datas(&ids, None).await?;
    let eligible: Vec<&TokenData> = match &args.eligibility {
        Some(path) => EligibilityFilter::load(path)?.apply(&token_datas),
        None => token_datas.iter().collect(),
    };

    println!("{}", serde_json::to_string_pretty(&eligible)?);

    if args.print_metrics {
        eprintln!("{}", metrics::gather()?);
    }
    Ok(())
}
