use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::info;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::core::clients::billing::BillingClient;
use crate::core::clients::directory::DirectoryClient;
use crate::core::config::AppConfig;
use crate::core::mailer::Mailer;
use crate::core::models::cost::CostTable;
use crate::core::report::window::ReportWindows;
use crate::core::report::{aggregate, render};

#[derive(Serialize)]
struct ReportPayload<'a> {
    monthly: &'a CostTable,
    daily: &'a CostTable,
}

/// Run the whole report pipeline: enumerate accounts, fetch both windows per
/// account sequentially, aggregate, render, then send (or write with
/// --dry-run). The first failure anywhere aborts the run; no partial report
/// is ever produced.
pub async fn run(dry_run: bool, output: Option<PathBuf>, opts: &OutputOptions) -> Result<()> {
    let config = AppConfig::load()?;
    let issues = config.validate();
    if !issues.is_empty() {
        anyhow::bail!("Invalid config:\n  - {}", issues.join("\n  - "));
    }

    let today = chrono::Local::now().date_naive();
    let windows = ReportWindows::compute(today);
    info!(
        monthly_start = %windows.monthly.start,
        monthly_end = %windows.monthly.end,
        daily_start = %windows.daily.start,
        daily_end = %windows.daily.end,
        "Computed reporting windows"
    );

    let directory = DirectoryClient::new(&config.directory.endpoint)?;
    let billing = BillingClient::new(&config.billing.endpoint)?;

    let accounts = directory.list_accounts().await?;
    info!(accounts = accounts.len(), "Enumerated organization");

    // Two independent collections, one per window. Each account issues the
    // monthly query then the daily query, sequentially.
    let mut monthly_entries = Vec::with_capacity(accounts.len());
    let mut daily_entries = Vec::with_capacity(accounts.len());
    for account in &accounts {
        let records = billing.fetch_window(&account.id, &windows.monthly).await?;
        monthly_entries.push(aggregate::account_entry(account, &records));

        let records = billing.fetch_window(&account.id, &windows.daily).await?;
        daily_entries.push(aggregate::account_entry(account, &records));
    }

    let monthly = aggregate::build_table(monthly_entries);
    let daily = aggregate::build_table(daily_entries);

    let css = render::load_stylesheet(config.report.stylesheet.as_deref())?;
    let body = render::render_report(&css, &monthly, &daily);

    if dry_run {
        match &output {
            Some(path) => {
                std::fs::write(path, &body)
                    .with_context(|| format!("Failed to write report to {}", path.display()))?;
                eprintln!("Wrote report to {}", path.display());
            }
            None => {
                print!("{}", body);
                return Ok(());
            }
        }
    } else {
        Mailer::new(config.email.clone()).send(&body).await?;
    }

    print_summary(&config, &monthly, &daily, dry_run, opts)?;
    Ok(())
}

fn print_summary(
    config: &AppConfig,
    monthly: &CostTable,
    daily: &CostTable,
    dry_run: bool,
    opts: &OutputOptions,
) -> Result<()> {
    match opts.format {
        OutputFormat::Json => {
            let payload = ReportPayload { monthly, daily };
            let json = if opts.pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            colored::control::set_override(opts.use_color);
            println!(
                " {}  {} accounts  {}",
                "Monthly".bold(),
                monthly.entries.len(),
                render::format_amount(monthly.grand_total).green()
            );
            println!(
                " {}    {} accounts  {}",
                "Daily".bold(),
                daily.entries.len(),
                render::format_amount(daily.grand_total).green()
            );
            if !dry_run {
                println!("Report sent to {}", config.email.recipient);
            }
        }
    }
    Ok(())
}
