use clap::{Parser, Subcommand};
use hospital_core::{
    constants::DEFAULT_CRITICAL_SEVERITY_THRESHOLD, quote, AdmissionAttributes, BillingStrategy,
    CareProfile, Category, CoreConfig, HospitalResult,
};
use std::sync::Arc;

mod script;

#[derive(Parser)]
#[command(name = "hospital")]
#[command(about = "Hospital admission and billing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List billing strategies
    Strategies,
    /// Price a treatment without admitting anyone
    Quote {
        /// Patient category (General, Emergency, ICU)
        category: String,
        /// Diagnosis (General)
        #[arg(long)]
        diagnosis: Option<String>,
        /// Emergency type (Emergency)
        #[arg(long)]
        emergency_type: Option<String>,
        /// Severity 1-5, clamped (Emergency)
        #[arg(long, allow_negative_numbers = true)]
        severity: Option<i64>,
        /// Days in ICU (ICU)
        #[arg(long, allow_negative_numbers = true)]
        icu_days: Option<i64>,
        /// Ventilator required (ICU)
        #[arg(long)]
        ventilator: bool,
        /// Billing strategy
        #[arg(long, default_value = "Standard")]
        strategy: String,
    },
    /// Replay a YAML script of admissions, bills and updates
    Replay {
        /// Path to the script
        path: std::path::PathBuf,
        /// Emergency severity that raises a critical alert (default 4)
        #[arg(long)]
        critical_severity: Option<u8>,
    },
}

fn strategy_lines() -> Vec<String> {
    BillingStrategy::ALL
        .into_iter()
        .map(|s| format!("{:<14} x{:.2}  {}", s.name(), s.multiplier(), s.description()))
        .collect()
}

fn quote_lines(
    category: &str,
    attributes: AdmissionAttributes,
    strategy: &str,
) -> HospitalResult<Vec<String>> {
    let category: Category = category.parse()?;
    let profile = CareProfile::from_attributes(category, attributes)?;
    let quote = quote(&profile, strategy)?;
    Ok(vec![
        format!("Category: {}", quote.category),
        format!("Base Cost: Rs.{:.2}", quote.base_cost),
        format!("Strategy: {}", quote.strategy.description()),
        format!("FINAL: Rs.{:.2}", quote.final_amount),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Strategies) => {
            for line in strategy_lines() {
                println!("{line}");
            }
        }
        Some(Commands::Quote {
            category,
            diagnosis,
            emergency_type,
            severity,
            icu_days,
            ventilator,
            strategy,
        }) => {
            let attributes = AdmissionAttributes {
                diagnosis,
                emergency_type,
                severity,
                icu_days,
                requires_ventilator: ventilator.then_some(true),
            };
            match quote_lines(&category, attributes, &strategy) {
                Ok(lines) => {
                    for line in lines {
                        println!("{line}");
                    }
                }
                Err(e) => eprintln!("Error pricing treatment: {}", e),
            }
        }
        Some(Commands::Replay {
            path,
            critical_severity,
        }) => {
            let threshold = critical_severity.unwrap_or(DEFAULT_CRITICAL_SEVERITY_THRESHOLD);
            let cfg = CoreConfig::default();
            let cfg = Arc::new(CoreConfig::new(
                threshold,
                cfg.patient_id_prefix().to_string(),
                cfg.bill_id_prefix().to_string(),
            )?);

            let contents = std::fs::read_to_string(&path)?;
            let script = script::Script::parse(&contents)?;
            let replay = script::replay(script, cfg);
            for line in &replay.lines {
                println!("{line}");
            }
            if replay.failed_steps > 0 {
                eprintln!("{} step(s) failed", replay.failed_steps);
            }
        }
        None => {
            println!("Use 'hospital --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_for_ventilated_icu_patient() {
        let lines = quote_lines("icu", AdmissionAttributes::icu(2, true), "government").unwrap();
        assert_eq!(
            lines,
            vec![
                "Category: ICU".to_string(),
                "Base Cost: Rs.56000.00".to_string(),
                "Strategy: Government (90% subsidy)".to_string(),
                "FINAL: Rs.5600.00".to_string(),
            ]
        );
    }

    #[test]
    fn quote_rejects_unknown_strategy() {
        let err = quote_lines("General", AdmissionAttributes::general("Cold"), "Gold")
            .expect_err("unknown strategy");
        assert!(matches!(err, hospital_core::HospitalError::UnknownStrategy(_)));
    }

    #[test]
    fn strategies_listed_in_fixed_order() {
        let lines = strategy_lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Standard"));
        assert!(lines[3].contains("Government (90% subsidy)"));
    }

    #[test]
    fn cli_parses_quote_flags() {
        let cli = Cli::try_parse_from([
            "hospital",
            "quote",
            "emergency",
            "--emergency-type",
            "Burns",
            "--severity",
            "-1",
        ])
        .expect("valid arguments");
        match cli.command {
            Some(Commands::Quote {
                severity, strategy, ..
            }) => {
                assert_eq!(severity, Some(-1));
                assert_eq!(strategy, "Standard");
            }
            _ => panic!("expected quote command"),
        }
    }
}
