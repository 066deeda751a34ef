// ============================================================================
// BeefyWallet - Ligne de commande
// ============================================================================
// Interroge l'API Beefy Finance et affiche le résultat normalisé en JSON
//
// CONCEPTS RUST CLÉS :
// 1. Clap derive : les sous-commandes sont un enum
// 2. Async dans sync : tokio::runtime::Runtime pour les appels API
// 3. anyhow : contexte sur les erreurs au niveau application
// ============================================================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

use beefywallet::api::BeefyClient;
use beefywallet::config::{ClientConfig, DEFAULT_BASE_URL};

// ============================================================================
// Arguments
// ============================================================================

/// Client en ligne de commande pour l'API Beefy Finance
#[derive(Debug, Parser)]
#[command(name = "beefywallet", version, about)]
struct Cli {
    /// URL de base de l'API
    #[arg(long, env = "BEEFY_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// User-Agent envoyé à l'API (par défaut : beefywallet/<version>)
    #[arg(long)]
    user_agent: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Une sous-commande par opération du client
#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Prix des tokens simples
    Prices,
    /// Prix des LP tokens
    Lps,
    /// Prix simples et LP fusionnés
    AllPrices,
    /// Détail des APY par vault
    Apy,
    /// Liste des vaults
    Vaults,
    /// Vaults avec APY et rendement journalier
    VaultsWithApy,
    /// TVL par vault
    Tvl,
    /// TVL totale
    TotalTvl,
    /// Rachats de BIFI par chain
    Buyback,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Le JSON part sur stdout : les logs vont dans un fichier pour ne pas
// polluer la sortie
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// Les logs sont écrits dans ./logs/beefywallet.log (rotation quotidienne).
///
/// # Utilisation
/// ```bash
/// RUST_LOG=debug beefywallet tvl
/// RUST_LOG=beefywallet=trace beefywallet vaults-with-apy
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");

    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "beefywallet.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour beefywallet, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beefywallet=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(command = ?cli.command, "BeefyWallet starting up");

    let mut config = ClientConfig::default().with_base_url(cli.base_url);
    if let Some(user_agent) = cli.user_agent {
        config = config.with_user_agent(user_agent);
    }
    let client = BeefyClient::new(config).context("Échec de la création du client Beefy")?;
    info!(base_url = %client.base_url(), "Beefy client ready");

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(&client, cli.command));

    match &result {
        Ok(_) => info!("Command completed"),
        Err(e) => error!(error = ?e, "Command failed"),
    }

    result
}

/// Exécute une sous-commande et affiche son résultat sur stdout
async fn run(client: &BeefyClient, command: Command) -> Result<()> {
    match command {
        Command::Prices => print_json(&client.get_single_prices().await?),
        Command::Lps => print_json(&client.get_lp_prices().await?),
        Command::AllPrices => print_json(&client.get_all_prices().await?),
        Command::Apy => print_json(&client.get_apy_breakdown().await?),
        Command::Vaults => print_json(&client.get_vaults().await?),
        Command::VaultsWithApy => print_json(&client.get_vaults_with_apy().await?),
        Command::Tvl => print_json(&client.get_tvls().await?),
        Command::TotalTvl => {
            let total = client.get_total_tvl().await?;
            println!("{}", total);
            Ok(())
        }
        Command::Buyback => print_json(&client.get_buyback().await?),
    }
}

/// Affiche une valeur en JSON indenté
fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Échec de la sérialisation JSON")?;
    println!("{}", json);
    Ok(())
}
