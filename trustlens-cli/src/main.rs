//! trustlens CLI
//!
//! Composite borrower trust scoring for peer lending.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use trustlens_core::{IdentitySource, ProximityTier, Subject, TrustResult};
use trustlens_engine::{
    verify_identity, Clock, CommerceRevenueProvider, EngineConfig, IdentityCrossCheckProvider,
    ProximityConfig, ScoringEngine, SocialProximityCalculator, SystemClock,
};
use trustlens_providers::{
    AuraClient, CommerceClient, CommerceConfig, KarmaClient, ReputationConfig, SharedProvider,
    SignalProvider, SocialGraphClient, SocialGraphConfig,
};

/// Composite score confidence below which results render as
/// "insufficient data" instead of a number
const DISPLAY_CONFIDENCE_FLOOR: f64 = 0.2;

#[derive(Parser)]
#[command(name = "trustlens")]
#[command(author, version, about = "trustlens: composite borrower trust scoring", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the composite trust score for a subject
    Score {
        /// Wallet address (0x...) or platform:handle
        #[arg(short, long)]
        subject: String,

        /// Self-reported borrower name (feeds identity cross-check)
        #[arg(long)]
        name: Option<String>,

        /// Self-reported borrower email
        #[arg(long)]
        email: Option<String>,

        /// Engine configuration file (TOML); defaults apply if absent
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Social proximity between two participants
    Proximity {
        /// First participant (address or handle)
        #[arg(long)]
        a: String,

        /// Second participant
        #[arg(long)]
        b: String,
    },

    /// Cross-check self-reported identity against the connected
    /// commerce account
    Verify {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    /// Show which signal providers are configured
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Score {
            subject,
            name,
            email,
            config,
        } => run_score(&subject, name, email, config).await?,
        Commands::Proximity { a, b } => run_proximity(&a, &b).await,
        Commands::Verify { name, email } => run_verify(name, email).await,
        Commands::Status => run_status(),
    }

    Ok(())
}

fn build_engine(
    config: EngineConfig,
    self_name: Option<String>,
    self_email: Option<String>,
) -> ScoringEngine {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let social = Arc::new(SocialGraphClient::new(SocialGraphConfig::default()));
    let karma = Arc::new(KarmaClient::new(ReputationConfig::karma()));
    let aura = Arc::new(AuraClient::new(ReputationConfig::aura()));
    let commerce = Arc::new(CommerceClient::new(CommerceConfig::default()));
    let self_reported = IdentitySource::new("self_reported", self_name, self_email);

    let providers: Vec<SharedProvider> = vec![
        social,
        karma,
        aura,
        Arc::new(CommerceRevenueProvider::new(commerce.clone(), clock.clone())),
        Arc::new(IdentityCrossCheckProvider::new(commerce, self_reported)),
    ];

    ScoringEngine::new(config, providers, clock)
}

async fn run_score(
    subject: &str,
    name: Option<String>,
    email: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let subject = Subject::parse(subject).ok_or_else(|| {
        anyhow::anyhow!("subject must be a 0x wallet address or platform:handle")
    })?;

    let config = match config_path {
        Some(path) => EngineConfig::from_toml_file(&path)?,
        None => EngineConfig::default(),
    };

    println!("🔍 Scoring {}\n", subject);

    let engine = build_engine(config, name, email);
    let result = engine.score(&subject).await;
    print_trust_result(&result);
    Ok(())
}

fn print_trust_result(result: &TrustResult) {
    println!("📊 Per-source signals:");
    if result.signals.is_empty() {
        println!("   (none)");
    }
    for (source, signal) in &result.signals {
        if signal.is_known() {
            println!(
                "   {:<22} raw={:<10.2} normalized={:.2} confidence={:.2}",
                source.as_str(),
                signal.raw_value,
                signal.normalized,
                signal.confidence
            );
        } else {
            println!("   {:<22} unknown", source.as_str());
        }
    }

    println!();
    if result.confidence < DISPLAY_CONFIDENCE_FLOOR || result.composite.is_none() {
        println!("⚠️  Insufficient data to score this subject");
        println!(
            "   ({:.0}% of configured sources contributed)",
            result.confidence * 100.0
        );
        return;
    }

    // checked above
    let composite = result.composite.unwrap_or_default();
    println!("✅ Composite score: {:.3}", composite);
    println!("   Tier:       {}", result.tier);
    println!("   Confidence: {:.0}%", result.confidence * 100.0);
    println!("   Query id:   {}", result.id);
}

async fn run_proximity(a: &str, b: &str) {
    println!("🔍 Social proximity: {} <-> {}\n", a, b);

    let client = Arc::new(SocialGraphClient::new(SocialGraphConfig::default()));
    let calculator =
        SocialProximityCalculator::new(client, Arc::new(SystemClock), ProximityConfig::default());

    let result = calculator.proximity(a, b).await;
    if result.risk_tier == ProximityTier::None {
        println!("⚠️  Proximity unavailable: one or both social profiles could not be resolved");
        return;
    }

    println!("   Mutual connections: {}", result.mutual_connections);
    println!(
        "   Quality-weighted:   {:.2}",
        result.quality_weighted_mutuals
    );
    println!("   Social distance:    {:.1} / 100", result.social_distance);
    println!("   Overlap:            {:.1}%", result.overlap_percent);
    println!("   Risk tier:          {:?}", result.risk_tier);
}

async fn run_verify(name: Option<String>, email: Option<String>) {
    println!("🔍 Identity cross-check\n");

    let client = CommerceClient::new(CommerceConfig::default());
    let owner = match client.fetch_owner_profile().await {
        Ok(owner) => owner,
        Err(e) => {
            println!("⚠️  Could not fetch connected account profile: {}", e);
            return;
        }
    };

    let sources = [
        IdentitySource::new("self_reported", name, email),
        IdentitySource::new("commerce_account", owner.name, owner.email),
    ];
    let result = verify_identity(&sources);

    println!("   Name:       {:?}", result.name_match);
    println!("   Email:      {:?}", result.email_match);
    println!("   Confidence: {}/100 (advisory, not a verification)", result.confidence);
    if result.flags.is_empty() {
        println!("   Flags:      none");
    } else {
        for flag in &result.flags {
            println!("   Flag:       {}", flag);
        }
    }
}

fn run_status() {
    println!("🔌 Provider status\n");

    let social = SocialGraphClient::new(SocialGraphConfig::default());
    let karma = KarmaClient::new(ReputationConfig::karma());
    let aura = AuraClient::new(ReputationConfig::aura());
    let commerce = CommerceClient::new(CommerceConfig::default());

    let rows: [(&str, bool, &str); 4] = [
        ("social_graph", social.is_configured(), "SOCIAL_GRAPH_API_KEY"),
        ("reputation_karma", karma.is_configured(), "KARMA_API_KEY"),
        ("reputation_aura", aura.is_configured(), "AURA_API_KEY"),
        (
            "commerce_revenue",
            commerce.is_configured(),
            "COMMERCE_ACCESS_TOKEN",
        ),
    ];

    for (name, configured, env_var) in rows {
        if configured {
            println!("   ✅ {:<18} configured", name);
        } else {
            println!("   ❌ {:<18} missing credential ({})", name, env_var);
        }
    }
    println!("\n   identity_cross_check follows the commerce credential.");
}
