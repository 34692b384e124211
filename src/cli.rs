use clap::{ArgGroup, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly meal plan generator (7 days x 3 meals)", long_about = None)]
#[command(group(ArgGroup::new("source").required(true).args(["csv", "supabase"])))]
pub struct Cli {
    /// Path to the ingredient CSV table
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Load ingredients and pairings from the hosted tables (SUPABASE_URL / SUPABASE_KEY)
    #[arg(long)]
    pub supabase: bool,

    /// Optional name-based pairing CSV (ingredient_a,ingredient_b,pairing_score)
    #[arg(long)]
    pub pairings: Option<PathBuf>,

    /// Minimum pairing score for a pair to count as validated
    #[arg(long, default_value_t = 5)]
    pub pairing_min_score: i64,

    /// Daily protein target (g)
    #[arg(long)]
    pub protein: f64,

    /// Daily carbohydrate target (g)
    #[arg(long)]
    pub carbs: f64,

    /// Daily fat target (g)
    #[arg(long)]
    pub fat: f64,

    /// Comma-separated allergens to avoid
    #[arg(long, default_value = "")]
    pub allergens: String,

    /// Search preset: fast, balanced, quality or deep
    #[arg(long, default_value = "balanced")]
    pub preset: String,

    /// Seed for the random generator
    #[arg(long, default_value_t = 12345)]
    pub seed: u64,

    /// Upper bound on (breakfast, lunch, dinner) combinations evaluated per day
    #[arg(long)]
    pub max_combinations: Option<usize>,

    /// Output JSON path
    #[arg(long, default_value = "runs/weekly_plan.json")]
    pub out: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn allergen_list(&self) -> Vec<String> {
        self.allergens
            .split(',')
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect()
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_source() {
        let cli = Cli::try_parse_from([
            "meal-planner", "--csv", "data.csv", "--protein", "150", "--carbs", "250", "--fat", "60",
            "--allergens", "Gluten, dairy,,",
        ])
        .unwrap();
        assert_eq!(cli.csv, Some(PathBuf::from("data.csv")));
        assert_eq!(cli.preset, "balanced");
        assert_eq!(cli.seed, 12345);
        assert_eq!(cli.allergen_list(), vec!["gluten", "dairy"]);
    }

    #[test]
    fn test_source_is_required_and_exclusive() {
        let missing = Cli::try_parse_from(["meal-planner", "--protein", "1", "--carbs", "1", "--fat", "1"]);
        assert!(missing.is_err());
        let both = Cli::try_parse_from([
            "meal-planner", "--csv", "a.csv", "--supabase", "--protein", "1", "--carbs", "1", "--fat", "1",
        ]);
        assert!(both.is_err());
    }
}
