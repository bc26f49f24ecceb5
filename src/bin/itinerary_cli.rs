//! Itinerary CLI
//!
//! Usage:
//!   cargo run --features cli --bin itinerary_cli -- catalog
//!   cargo run --features cli --bin itinerary_cli -- plan --from "London, UK" --to SFO \
//!     --industry Healthcare --company-type B2C
//!
//! Offline replay of a saved generator response:
//!   cargo run --features cli --bin itinerary_cli -- plan --from LHR --to SFO \
//!     --replay response.json --json

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use itinerary_pipeline::{
    CannedLlmClient, Catalog, GeminiClient, GenerationConfig, Itinerary, ItineraryPipeline,
    LlmClient, PipelineOutcome, RequesterProfile, TripRequest,
};

#[derive(Parser, Debug)]
#[command(name = "itinerary_cli")]
#[command(about = "Generate strategy itineraries between marketing functions")]
struct Cli {
    /// Load the catalog from a YAML file instead of the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List catalog nodes grouped by category
    Catalog,
    /// Generate itineraries from one node to another
    Plan(PlanArgs),
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Origin node name or short code
    #[arg(long)]
    from: String,

    /// Destination node name or short code
    #[arg(long)]
    to: String,

    #[arg(long, default_value = "CMO")]
    role: String,

    #[arg(long, default_value = "Finance")]
    industry: String,

    /// Employee-count bucket
    #[arg(long, default_value = "100-500")]
    company_size: String,

    #[arg(long, default_value = "$50M - $100M")]
    revenue: String,

    #[arg(long, default_value = "B2B")]
    company_type: String,

    #[arg(long, default_value = "Improve pipeline quality")]
    purpose: String,

    /// Gemini model override
    #[arg(long, env = "GEMINI_MODEL")]
    model: Option<String>,

    /// Use a saved generator response instead of calling the service
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Print itineraries as JSON
    #[arg(long)]
    json: bool,
}

impl PlanArgs {
    fn profile(&self) -> RequesterProfile {
        RequesterProfile {
            role: self.role.clone(),
            industry: self.industry.clone(),
            company_size: self.company_size.clone(),
            revenue: self.revenue.clone(),
            company_type: self.company_type.clone(),
            journey_purpose: self.purpose.clone(),
        }
    }

    fn client(&self) -> Result<Arc<dyn LlmClient>> {
        if let Some(path) = &self.replay {
            let payload = std::fs::read_to_string(path)
                .with_context(|| format!("reading replay file {}", path.display()))?;
            return Ok(Arc::new(CannedLlmClient::ok(payload)));
        }

        let mut config = GenerationConfig::from_env()?;
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        Ok(Arc::new(GeminiClient::new(config)?))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => Arc::new(
            Catalog::from_path(path)
                .with_context(|| format!("loading catalog {}", path.display()))?,
        ),
        None => Catalog::default_catalog(),
    };

    match cli.command {
        Command::Catalog => print_catalog(&catalog),
        Command::Plan(args) => plan(catalog, args).await,
    }
}

fn print_catalog(catalog: &Catalog) -> Result<()> {
    for category in catalog.categories() {
        println!("{}", category);
        for node in catalog.by_category(category) {
            println!(
                "  {:<4} {:<26} {:<32} {}",
                catalog.code_or_unknown(&node.name),
                node.name,
                node.function,
                node.description
            );
        }
        println!();
    }
    Ok(())
}

async fn plan(catalog: Arc<Catalog>, args: PlanArgs) -> Result<()> {
    let request = TripRequest::resolve(&catalog, &args.from, &args.to, args.profile())?;
    let pipeline = ItineraryPipeline::new(args.client()?, catalog);

    let report = pipeline
        .run_detailed(&request, chrono::Local::now().naive_local())
        .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.itineraries)?);
    } else {
        for itinerary in &report.itineraries {
            print_card(itinerary);
        }
    }

    match report.outcome {
        PipelineOutcome::Completed if report.itineraries.is_empty() => {
            bail!("No itineraries could be built for this trip")
        }
        PipelineOutcome::Completed => Ok(()),
        PipelineOutcome::GenerationFailed(reason) | PipelineOutcome::MalformedOutput(reason) => {
            bail!("No itineraries: {}", reason)
        }
    }
}

fn print_card(itinerary: &Itinerary) {
    let stops = match itinerary.stop_count() {
        0 => "Direct".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    };

    println!(
        "{}  [{}]  {}  {}  {}",
        itinerary.provider,
        itinerary.id,
        itinerary.formatted_price(),
        itinerary.total_duration,
        stops
    );
    println!("  {}", itinerary.route_codes());
    if !itinerary.tags.is_empty() {
        println!("  Tags: {}", itinerary.tags.join(", "));
    }
    if !itinerary.summary.is_empty() {
        println!("  {}", itinerary.summary);
    }
    for step in &itinerary.steps {
        println!(
            "    {} → {}  {:<4} {} ({})",
            step.departure_time, step.arrival_time, step.code, step.node_name, step.function
        );
        if !step.rationale.is_empty() {
            println!("        {}", step.rationale);
        }
    }
    println!();
}
