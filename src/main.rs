use anyhow::{bail, Result};
use dartscraper::api::{self, ReportCode};
use dartscraper::{Config, CorpDirectory};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "usage: dartscraper [list | search <query> | get <corp-code> | profile <corp-code> | financials <corp-code> <year|start-end> [report-code]]";

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init config + logging ────────────────────────────────────
    dotenvy::dotenv().ok();
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = Config::from_env()?;
    let directory = CorpDirectory::new(cfg.clone())?;

    // ─── 2) dispatch ─────────────────────────────────────────────────
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("list") => {
            let table = directory.list_all().await?;
            info!(fetches = directory.fetch_count(), "table ready");
            println!("{} companies", table.len());
            for record in table.iter().take(10) {
                print_record(record);
            }
        }
        Some("search") => {
            let Some(query) = args.get(1) else {
                bail!("{USAGE}");
            };
            let hits = directory.search_by_name(query).await?;
            println!("{} match(es) for {query:?}", hits.len());
            for record in &hits {
                print_record(record);
            }
        }
        Some("get") => {
            let Some(code) = args.get(1) else {
                bail!("{USAGE}");
            };
            let record = directory.get_by_code(&api::normalize_corp_code(code)).await?;
            print_record(&record);
        }
        Some("profile") => {
            let Some(code) = args.get(1) else {
                bail!("{USAGE}");
            };
            let client = Client::new();
            let profile = api::company_profile(&client, &cfg, code).await?;
            println!("{} ({})", profile.corp_name, profile.corp_code);
            if let Some(stock) = &profile.stock_code {
                println!("  stock code : {stock}");
            }
            if let Some(ceo) = &profile.ceo_nm {
                println!("  ceo        : {ceo}");
            }
            if let Some(address) = &profile.adres {
                println!("  address    : {address}");
            }
            if let Some(est) = &profile.est_dt {
                println!("  established: {est}");
            }
        }
        Some("financials") => {
            let (Some(code), Some(years)) = (args.get(1), args.get(2)) else {
                bail!("{USAGE}");
            };
            let report = match args.get(3) {
                Some(raw) => match ReportCode::from_code(raw) {
                    Some(report) => report,
                    None => bail!("unknown report code {raw:?} (11011/11012/11013/11014)"),
                },
                None => ReportCode::Annual,
            };

            let client = Client::new();
            let rows = match years.split_once('-') {
                Some((start, end)) => {
                    let range = start.parse::<u16>()?..=end.parse::<u16>()?;
                    api::financial_statements_range(&client, &cfg, code, range, report).await?
                }
                None => {
                    api::financial_statements(&client, &cfg, code, years.parse()?, report).await?
                }
            };

            println!("{} account row(s), {}", rows.len(), report.label());
            for row in &rows {
                let amount = row
                    .thstrm()
                    .map(api::format_amount)
                    .unwrap_or_else(|| "-".to_string());
                println!("  {} {} / {}: {}", row.bsns_year, row.sj_nm, row.account_nm, amount);
            }
        }
        Some(other) => bail!("unknown command {other:?}\n{USAGE}"),
    }

    Ok(())
}

fn print_record(record: &dartscraper::CorpRecord) {
    let date = record.modify_date.as_deref().unwrap_or("-");
    println!("  {}  {}  {}", record.corp_code, record.corp_name, date);
}
