use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use fee_calculator::{compute_fees, Decimal, FeeBreakdown, FeeConfiguration};
use rpc_types::error::ErrorCode;
use rpc_types::parse_fee_configuration;
use tracing::{debug, info};

mod logging;
mod render;

use render::TextStyle;

#[derive(Debug, Parser)]
#[command(version, about = "Estimate advisory fees for an M&A mandate")]
struct Opts {
    /// Tracing filter directives, e.g. `fee_calculator=debug`
    #[arg(long, global = true, env = "FEE_SIM_LOG", default_value = logging::DEFAULT_LOG_FILTER)]
    log_filter: String,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Decimal places shown in text output
    #[arg(long, global = true, default_value_t = 2)]
    round: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the fee breakdown for a saved fee configuration (`-` reads stdin).
    Compute { config: PathBuf },
    /// Recompute a fee configuration for several operation values.
    Simulate {
        config: PathBuf,
        #[arg(long = "value", required = true)]
        values: Vec<Decimal>,
    },
}

fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    logging::init_logging(&opts.log_filter);
    let stdout = io::stdout();
    run(&opts, &mut stdout.lock())
}

fn run(opts: &Opts, out: &mut impl Write) -> anyhow::Result<()> {
    let style = TextStyle {
        decimal_places: opts.round,
    };
    match &opts.command {
        Command::Compute { config } => {
            let config = load_configuration(config)?;
            let breakdown = compute_fees(&config);
            debug!(total = %breakdown.total, "Computed fee breakdown");
            match opts.format {
                OutputFormat::Text => render::write_breakdown_text(out, style, &config, &breakdown)?,
                OutputFormat::Json => render::write_breakdown_json(out, &config, &breakdown)?,
            }
        }
        Command::Simulate { config, values } => {
            let config = load_configuration(config)?;
            let rows = simulate(&config, values);
            match opts.format {
                OutputFormat::Text => render::write_simulation_text(out, style, &rows)?,
                OutputFormat::Json => render::write_simulation_json(out, &rows)?,
            }
        }
    }
    Ok(())
}

fn simulate(config: &FeeConfiguration, values: &[Decimal]) -> Vec<(FeeConfiguration, FeeBreakdown)> {
    values
        .iter()
        .map(|&operation_value| {
            let config = FeeConfiguration {
                operation_value,
                ..config.clone()
            };
            let breakdown = compute_fees(&config);
            (config, breakdown)
        })
        .collect()
}

fn load_configuration(path: &Path) -> anyhow::Result<FeeConfiguration> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read fee configuration from stdin")?;
        raw
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fee configuration {}", path.display()))?
    };
    info!(source = %path.display(), "Loaded fee configuration");
    configuration_from_json(&raw)
}

fn configuration_from_json(json: &str) -> anyhow::Result<FeeConfiguration> {
    let raw = parse_fee_configuration(json)?;
    FeeConfiguration::try_from(raw).context(ErrorCode::InvalidFeeConfiguration)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn test_parse_compute() {
        let opts = Opts::try_parse_from(["fee-sim", "compute", "mandate.json"]).unwrap();
        assert_eq!(opts.format, OutputFormat::Text);
        assert_eq!(opts.round, 2);
        assert!(matches!(
            opts.command,
            Command::Compute { config } if config == Path::new("mandate.json")
        ));
    }

    #[test]
    fn test_parse_simulate() {
        let opts = Opts::try_parse_from([
            "fee-sim",
            "--format",
            "json",
            "simulate",
            "-",
            "--value",
            "10000000",
            "--value",
            "25000000.50",
        ])
        .unwrap();
        assert_eq!(opts.format, OutputFormat::Json);
        let Command::Simulate { config, values } = opts.command else {
            panic!("expected simulate");
        };
        assert_eq!(config, Path::new("-"));
        assert_eq!(values, vec![dec!(10000000), dec!(25000000.50)]);
    }

    #[test]
    fn test_simulate_requires_value() {
        assert!(Opts::try_parse_from(["fee-sim", "simulate", "mandate.json"]).is_err());
        assert!(
            Opts::try_parse_from(["fee-sim", "simulate", "mandate.json", "--value", "ten"])
                .is_err()
        );
    }

    #[test]
    fn test_simulate_overrides_operation_value() {
        let config = FeeConfiguration {
            operation_value: dec!(1),
            retainer: Some(dec!(1000)),
            ..Default::default()
        };
        let rows = simulate(&config, &[dec!(0), dec!(500000)]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.operation_value, dec!(0));
        assert_eq!(rows[0].1, FeeBreakdown::empty());
        assert_eq!(rows[1].0.operation_value, dec!(500000));
        assert_eq!(rows[1].1.total, dec!(1000));
    }

    #[test]
    fn test_invalid_configuration_carries_error_code() {
        let err = configuration_from_json(r#"{ "operationValue": "-5" }"#).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorCode>(),
            Some(&ErrorCode::InvalidFeeConfiguration)
        );

        let err = configuration_from_json("{ not json").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ErrorCode>(),
            Some(ErrorCode::InvalidJson(_))
        ));
    }

    #[test]
    fn test_configuration_from_json() {
        let config = configuration_from_json(
            r#"{ "operationValue": "30000000", "pipelineWeight": 80, "successFeePercentage": "1.5" }"#,
        )
        .unwrap();
        assert_eq!(config.operation_value, dec!(30000000));
        assert_eq!(compute_fees(&config).total, dec!(360000));
    }

    #[test]
    fn test_missing_configuration_file() {
        let err = load_configuration(Path::new("/nonexistent/mandate.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mandate.json"));
    }
}
