//! Command-line interface definitions and argument parsing

use clap::Parser;

use crate::error::{MAX_CLUSTERS, MIN_CLUSTERS};
use crate::model::KMeansParams;
use crate::pipeline::PersonaConfig;
use crate::report::DisplayNames;
use crate::strategy::{MetricColumns, Thresholds, DEFAULT_INCOME_COLUMN, DEFAULT_SPENDING_COLUMN};

/// Generate customer personas with K-Means and suggest a marketing strategy for each
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "Mall_Customers.csv")]
    pub input: String,

    /// Output path for the dataset with persona labels
    #[arg(short, long, default_value = "customer_personas.csv")]
    pub output: String,

    /// Number of personas to create (2-10)
    #[arg(
        short = 'k',
        long,
        default_value = "5",
        value_parser = clap::value_parser!(u8).range(MIN_CLUSTERS as i64..=MAX_CLUSTERS as i64)
    )]
    pub clusters: u8,

    /// Comma-separated feature columns; defaults to Age, income and spending score when present
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Seed for centroid initialization
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of K-Means initializations; the best one is kept
    #[arg(long, default_value = "10")]
    pub n_init: usize,

    /// Maximum iterations for K-Means algorithm
    #[arg(long, default_value = "300")]
    pub max_iters: usize,

    /// Tolerance for K-Means convergence
    #[arg(long, default_value = "1e-4")]
    pub tolerance: f64,

    /// Column read as the spending metric by the strategy rules
    #[arg(long, default_value = DEFAULT_SPENDING_COLUMN)]
    pub spending_column: String,

    /// Column read as the income metric by the strategy rules
    #[arg(long, default_value = DEFAULT_INCOME_COLUMN)]
    pub income_column: String,

    /// Persona display name as ID=NAME, may be repeated
    /// Example: --name "0=Weekend Splurgers"
    #[arg(short, long = "name")]
    pub names: Vec<String>,

    /// Write a JSON report of profiles and strategies to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Print a descriptive overview of the numeric columns first
    #[arg(long)]
    pub overview: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse the ID=NAME display name assignments
    pub fn parse_display_names(&self) -> crate::Result<DisplayNames> {
        let mut names = DisplayNames::new();
        for entry in &self.names {
            let Some((id, name)) = entry.split_once('=') else {
                anyhow::bail!("Persona names must be in format 'ID=NAME': {entry}");
            };
            let id: usize = id
                .trim()
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid persona id: {id}"))?;
            let name = name.trim();
            if name.is_empty() {
                anyhow::bail!("Persona {id} name must not be empty");
            }
            names.set(id, name);
        }
        Ok(names)
    }

    /// Pipeline configuration for the given feature columns
    pub fn persona_config(&self, features: Vec<String>) -> PersonaConfig {
        PersonaConfig {
            features,
            kmeans: KMeansParams::new(usize::from(self.clusters))
                .with_seed(self.seed)
                .with_n_init(self.n_init)
                .with_max_iters(self.max_iters)
                .with_tolerance(self.tolerance),
            metrics: MetricColumns {
                spending: self.spending_column.clone(),
                income: self.income_column.clone(),
            },
            thresholds: Thresholds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["persona-architect"]);
        assert_eq!(args.clusters, 5);
        assert_eq!(args.seed, 42);
        assert!(args.features.is_empty());
        assert_eq!(args.spending_column, "Spending Score (1-100)");

        let config = args.persona_config(vec!["Age".to_string()]);
        assert_eq!(config.kmeans.n_clusters, 5);
        assert_eq!(config.kmeans.n_init, 10);
        assert_eq!(config.metrics, MetricColumns::default());
    }

    #[test]
    fn test_feature_list_and_cluster_range() {
        let args = Args::parse_from(["persona-architect", "-k", "3", "--features", "Age,Annual Income (k$)"]);
        assert_eq!(args.clusters, 3);
        assert_eq!(args.features, vec!["Age", "Annual Income (k$)"]);

        assert!(Args::try_parse_from(["persona-architect", "-k", "1"]).is_err());
        assert!(Args::try_parse_from(["persona-architect", "-k", "11"]).is_err());
    }

    #[test]
    fn test_parse_display_names() {
        let mut args = Args::parse_from(["persona-architect", "--name", "0=VIPs", "-n", "2 = Bargain Hunters"]);
        let names = args.parse_display_names().unwrap();
        assert_eq!(names.name(0), "VIPs");
        assert_eq!(names.name(1), "Persona 1");
        assert_eq!(names.name(2), "Bargain Hunters");

        args.names = vec!["invalid".to_string()];
        assert!(args.parse_display_names().is_err());

        args.names = vec!["x=Name".to_string()];
        assert!(args.parse_display_names().is_err());
    }
}
