//! Installment Calculator CLI
//!
//! Command-line access to the schedule and forecast generators

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use installment_calc::{
    calendar::Locale,
    config::ServiceConfig,
    document::ScheduleDocument,
    forecast::{generate_investment_forecast, DEFAULT_INTEREST_RATE},
    money::{format_rub, group_thousands},
    plan::{BalancePolicy, InstallmentPlan, InstallmentPreset, IntermediatePayment},
    scenario::ScenarioRunner,
    schedule::PaymentSchedule,
    validation::{check_forecast, check_plan, parse_start_date, ForecastRequest},
};

#[derive(Parser, Debug)]
#[command(name = "installment_calc", version, about = "Installment schedules and investment forecasts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the payment schedule for a plan
    Schedule {
        #[command(flatten)]
        plan: PlanArgs,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Write the schedule document (CSV)
    Export {
        #[command(flatten)]
        plan: PlanArgs,

        /// Apartment number printed in the title
        #[arg(long)]
        apartment: u32,

        /// Output file (default: stdout)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Compare the standard presets at one price
    Presets {
        /// Base property price
        #[arg(long)]
        price: f64,

        #[arg(long, value_parser = parse_locale, default_value = "ru")]
        locale: Locale,

        #[arg(long)]
        json: bool,
    },
    /// Year-by-year compounding forecast
    Forecast {
        /// Starting capital
        #[arg(long)]
        capital: f64,

        /// Term in years
        #[arg(long)]
        years: u32,

        /// Annual interest rate, percent
        #[arg(long, default_value_t = DEFAULT_INTEREST_RATE)]
        rate: f64,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// Base property price
    #[arg(long)]
    price: f64,

    /// Use a standard preset (6, 12, 18, 24 or 36 months)
    #[arg(long)]
    preset: Option<u32>,

    /// Flat markup on the price, percent
    #[arg(long)]
    markup: Option<f64>,

    /// Down payment, percent of total cost
    #[arg(long)]
    down: Option<f64>,

    /// Number of months
    #[arg(long)]
    period: Option<u32>,

    /// Monthly payment, percent of total cost
    #[arg(long)]
    monthly: Option<f64>,

    /// One-time payment as MONTH:PERCENT, repeatable
    #[arg(long = "intermediate", value_parser = parse_intermediate)]
    intermediate: Vec<IntermediatePayment>,

    /// Date of the down payment (YYYY-MM-DD or RFC 3339), default today
    #[arg(long)]
    start_date: Option<String>,

    #[arg(long, value_parser = parse_locale, default_value = "ru")]
    locale: Locale,

    /// Cap payments at the remaining balance instead of zeroing them
    #[arg(long)]
    reconcile: bool,
}

fn parse_locale(s: &str) -> std::result::Result<Locale, String> {
    s.parse().map_err(|e: installment_calc::ValidationError| e.to_string())
}

fn parse_intermediate(s: &str) -> std::result::Result<IntermediatePayment, String> {
    let (month, percent) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MONTH:PERCENT, got '{}'", s))?;
    let month: u32 = month.trim().parse().map_err(|e| format!("bad month '{}': {}", month, e))?;
    let percent: f64 = percent
        .trim()
        .parse()
        .map_err(|e| format!("bad percent '{}': {}", percent, e))?;
    Ok(IntermediatePayment::new(month, percent))
}

impl PlanArgs {
    fn start_date(&self) -> Result<NaiveDate> {
        match &self.start_date {
            Some(raw) => Ok(parse_start_date(raw)?),
            None => Ok(Local::now().date_naive()),
        }
    }

    fn to_plan(&self, config: &ServiceConfig) -> Result<InstallmentPlan> {
        let mut plan = match self.preset {
            Some(months) => {
                let preset = InstallmentPreset::from_months(months)
                    .ok_or_else(|| anyhow!("no preset for {} months", months))?;
                InstallmentPlan::from_preset(preset, self.price)
            }
            None => InstallmentPlan::new(
                self.price,
                self.markup.context("--markup is required without --preset")?,
                self.down.context("--down is required without --preset")?,
                self.period.context("--period is required without --preset")?,
                self.monthly.context("--monthly is required without --preset")?,
            ),
        };

        if !self.intermediate.is_empty() {
            plan = plan.with_intermediate_payments(self.intermediate.clone());
        }
        if self.reconcile {
            plan = plan.with_balance_policy(BalancePolicy::Reconcile);
        }

        check_plan(&plan, config)?;
        Ok(plan)
    }

    fn generate(&self, config: &ServiceConfig) -> Result<(InstallmentPlan, PaymentSchedule)> {
        let plan = self.to_plan(config)?;
        let runner = ScenarioRunner::new(self.start_date()?).with_locale(self.locale);
        let schedule = runner.run(&plan).context("schedule generation failed")?;
        Ok((plan, schedule))
    }
}

fn print_schedule(schedule: &PaymentSchedule) {
    println!("{:>5} {:>10} {:>18}  {}", "Month", "Date", "Amount", "Note");
    println!("{}", "-".repeat(80));
    for item in &schedule.payment_schedule {
        println!(
            "{:>5} {:>10} {:>18}  {}",
            item.month,
            item.date,
            group_thousands(item.amount as f64),
            item.note
        );
    }
    println!();
    println!("Total cost:      {}", format_rub(schedule.total_cost));
    println!("Total scheduled: {}", format_rub(schedule.total_scheduled() as f64));
    println!("One-time total:  {}", format_rub(schedule.one_time_total() as f64));
    if schedule.rounding_drift().abs() >= 1.0 {
        println!("Drift:           {}", format_rub(schedule.rounding_drift()));
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ServiceConfig::from_env();

    match cli.command {
        Command::Schedule { plan, json } => {
            let (_, schedule) = plan.generate(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schedule)?);
            } else {
                print_schedule(&schedule);
            }
        }
        Command::Export { plan, apartment, output } => {
            let (installment_plan, schedule) = plan.generate(&config)?;
            let document = ScheduleDocument {
                apartment_number: apartment,
                property_price: installment_plan.property_price,
                installment_period: installment_plan.installment_period,
                generated_at: Local::now().naive_local(),
                locale: plan.locale,
            };
            let bytes = document.render(&schedule)?;

            match output {
                Some(path) => {
                    let mut file = File::create(&path)
                        .with_context(|| format!("unable to create {}", path.display()))?;
                    file.write_all(&bytes)?;
                    log::info!("document written to {}", path.display());
                }
                None => std::io::stdout().write_all(&bytes)?,
            }
        }
        Command::Presets { price, locale, json } => {
            let start = Local::now().date_naive();
            let rows = ScenarioRunner::new(start).with_locale(locale).compare_presets(price)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!(
                    "{:>6} {:>18} {:>18} {:>18} {:>18}",
                    "Months", "Total cost", "Down payment", "One-time", "Closing"
                );
                println!("{}", "-".repeat(82));
                for row in &rows {
                    println!(
                        "{:>6} {:>18} {:>18} {:>18} {:>18}",
                        row.months,
                        group_thousands(row.total_cost),
                        group_thousands(row.first_payment as f64),
                        group_thousands(row.one_time_total as f64),
                        group_thousands(row.last_payment as f64),
                    );
                }
            }
        }
        Command::Forecast { capital, years, rate, json } => {
            check_forecast(&ForecastRequest {
                starting_capital: capital,
                years,
                annual_interest_rate: rate,
            })?;
            let forecast = generate_investment_forecast(capital, years, rate);
            if json {
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            } else {
                println!("{:>5} {:>20} {:>20} {:>20}", "Year", "Start", "Profit", "End");
                println!("{}", "-".repeat(68));
                for d in &forecast.yearly_details {
                    println!(
                        "{:>5} {:>20} {:>20} {:>20}",
                        d.year,
                        group_thousands(d.start_amount),
                        group_thousands(d.yearly_profit),
                        group_thousands(d.end_amount),
                    );
                }
                println!();
                println!("Total amount: {}", format_rub(forecast.total_amount));
                println!("Profit:       {} ({:.2}%)", format_rub(forecast.profit), forecast.total_return_pct());
            }
        }
    }

    Ok(())
}
