use anyhow::{Context, Result};
use meal_planner::catalog::supabase::{SUPABASE_KEY_ENV_VAR, SUPABASE_URL_ENV_VAR};
use meal_planner::catalog::{load_ingredients_csv, load_pairings_csv, IngredientRecord, PairingSet, SupabaseCatalog};
use meal_planner::cli::{parse_args, Cli};
use meal_planner::planner::{MacroTargets, WeekPlanner};
use meal_planner::report::{format_summary, write_plan_json};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn load_catalog(cli: &Cli) -> Result<(Vec<IngredientRecord>, PairingSet)> {
    let (catalog, mut pairings) = if cli.supabase {
        let remote = SupabaseCatalog::from_env(SUPABASE_URL_ENV_VAR, SUPABASE_KEY_ENV_VAR)?;
        let catalog = remote
            .fetch_ingredients()
            .await
            .context("Failed to load remote ingredient catalog")?;
        let pairings = remote
            .fetch_pairings(&catalog, cli.pairing_min_score)
            .await
            .context("Failed to load remote pairings")?;
        (catalog, pairings)
    } else {
        let path = cli
            .csv
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Either --csv or --supabase must be given"))?;
        (load_ingredients_csv(path)?, PairingSet::default())
    };

    if let Some(path) = &cli.pairings {
        let extra = load_pairings_csv(path, cli.pairing_min_score)?;
        if pairings.is_empty() {
            pairings = extra;
        } else {
            info!(count = extra.len(), "ignoring pairing CSV, remote pairings already loaded");
        }
    }
    Ok((catalog, pairings))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = parse_args();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Preset errors surface before any catalog or generation work.
    let planner = WeekPlanner::from_preset_name(&cli.preset)?.with_max_combinations(cli.max_combinations);
    let settings = planner.settings();
    info!(
        preset = %planner.preset(),
        batch_size = settings.batch_size,
        top_k = settings.top_k,
        max_combinations = ?settings.max_combinations,
        "search settings"
    );

    let (catalog, pairings) = load_catalog(&cli).await?;
    let targets = MacroTargets { protein: cli.protein, carbs: cli.carbs, fat: cli.fat };
    let mut rng = StdRng::seed_from_u64(cli.seed);

    let plan = planner
        .plan_week(&catalog, targets, &cli.allergen_list(), &pairings, &mut rng)
        .context("Meal plan generation failed")?;

    write_plan_json(&plan, &cli.out).await?;
    info!(path = ?cli.out, "saved weekly plan");
    println!("{}", format_summary(&plan));

    Ok(())
}
