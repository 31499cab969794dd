// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl:   run the whole pipeline and store qualifying products in a CSV
// - product: check a single product page and print the verdict
//
// Everything else (start URLs, stop-lists, headers) comes from the TOML
// config file, see config.rs.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "composition-crawler",
    version,
    about = "Crawls a cosmetics catalog and keeps products whose ingredients pass a stop-list",
    long_about = "composition-crawler walks every paginated category listed in its config, \
                  reads each product's ingredient list and stores the products that contain \
                  none of the configured stop terms."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl every configured category and save qualifying products
    ///
    /// Example: composition-crawler crawl --config crawl.toml --out products.csv
    Crawl {
        /// Path to the TOML config file
        #[arg(long, short)]
        config: PathBuf,

        /// CSV table to add qualifying products to (created if missing)
        #[arg(long, short, default_value = "products.csv")]
        out: PathBuf,

        /// Number of product consumers (overrides the config file)
        #[arg(long)]
        workers: Option<usize>,

        /// Upper bound of the random pre-request delay in milliseconds
        /// (overrides the config file)
        #[arg(long)]
        max_delay_ms: Option<u64>,

        /// Print the final statistics as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Fetch one product page and show whether it qualifies
    ///
    /// Nothing is written to the product table.
    ///
    /// Example: composition-crawler product https://shop.example/argan-shampoo --config crawl.toml
    Product {
        /// Product page URL
        url: String,

        /// Path to the TOML config file
        #[arg(long, short)]
        config: PathBuf,

        /// Output the inspection as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_crawl() {
        let cli = Cli::try_parse_from([
            "composition-crawler",
            "crawl",
            "--config",
            "crawl.toml",
            "--workers",
            "5",
        ])
        .unwrap();

        match cli.command {
            Commands::Crawl { config, out, workers, max_delay_ms, json } => {
                assert_eq!(config, PathBuf::from("crawl.toml"));
                assert_eq!(out, PathBuf::from("products.csv"));
                assert_eq!(workers, Some(5));
                assert_eq!(max_delay_ms, None);
                assert!(!json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_product() {
        let cli = Cli::try_parse_from([
            "composition-crawler",
            "product",
            "https://shop.example/argan",
            "-c",
            "crawl.toml",
            "--json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Product { json: true, .. }));
    }

    #[test]
    fn test_config_required() {
        assert!(Cli::try_parse_from(["composition-crawler", "crawl"]).is_err());
    }
}
