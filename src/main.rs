use std::io::Write;
use std::process;

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use env_logger::Builder;
use log::{debug, info, LevelFilter};

mod cli;
mod commands;
mod config;
mod constants;
mod db;
mod error;
mod partition;
#[cfg(test)]
mod testing;

use cli::{Cli, Command};
use commands::{AddPartitionsOptions, FillOptions, PrepOptions, SwapOptions};
use config::settings::Settings;
use config::{parse_lock_timeout, parse_sleep, Defaults};
use db::PgDatabase;
use error::Result;
use partition::period::round_down;
use partition::{Period, Table};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    setup_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

/// 로거 설정 (RUST_LOG 가 있으면 우선)
fn setup_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::new()
        .filter(None, level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .parse_default_env()
        .init();
}

/// 인자 해석이 끝난 명령
enum Job {
    Prep(PrepOptions),
    Unprep(Table),
    AddPartitions(AddPartitionsOptions),
    Fill(FillOptions),
    Analyze { table: Table, swapped: bool },
    Swap(SwapOptions),
    Unswap(SwapOptions),
}

impl Job {
    /// 명령행 인자 + 설정 기본값 병합. DB 연결 전에 인자 오류를 걸러낸다
    fn from_command(command: Command, defaults: &Defaults) -> Result<Self> {
        let job = match command {
            Command::Prep {
                table,
                column,
                period,
                trigger_based,
                no_partition,
                test_version,
            } => Job::Prep(PrepOptions {
                table: Table::parse(&table),
                column,
                period: period.as_deref().map(str::parse::<Period>).transpose()?,
                trigger_based,
                partition: !no_partition,
                test_version,
            }),
            Command::Unprep { table } => Job::Unprep(Table::parse(&table)),
            Command::AddPartitions {
                table,
                intermediate,
                past,
                future,
                tablespace,
                use_view,
            } => Job::AddPartitions(AddPartitionsOptions {
                table: Table::parse(&table),
                intermediate,
                past,
                future,
                tablespace,
                use_view,
            }),
            Command::Fill {
                table,
                batch_size,
                swapped,
                source_table,
                dest_table,
                start,
                filter,
                sleep,
                use_view,
            } => Job::Fill(FillOptions {
                table: Table::parse(&table),
                batch_size: batch_size.unwrap_or(defaults.batch_size),
                swapped,
                source_table: source_table.as_deref().map(Table::parse),
                dest_table: dest_table.as_deref().map(Table::parse),
                start,
                filter,
                sleep: sleep
                    .or_else(|| defaults.sleep.clone())
                    .map(|s| parse_sleep(&s))
                    .transpose()?,
                use_view,
            }),
            Command::Analyze { table, swapped } => Job::Analyze {
                table: Table::parse(&table),
                swapped,
            },
            Command::Swap {
                table,
                lock_timeout,
                use_view,
            } => Job::Swap(swap_options(&table, lock_timeout, use_view, defaults)?),
            Command::Unswap {
                table,
                lock_timeout,
                use_view,
            } => Job::Unswap(swap_options(&table, lock_timeout, use_view, defaults)?),
        };
        Ok(job)
    }

    async fn run(self, db: &mut PgDatabase, today: NaiveDate) -> Result<()> {
        match self {
            Job::Prep(options) => commands::prep(db, &options).await,
            Job::Unprep(table) => commands::unprep(db, &table).await,
            Job::AddPartitions(options) => {
                commands::add_partitions(db, &options, today).await?;
                Ok(())
            }
            Job::Fill(options) => {
                let summary = commands::fill(db, &options).await?;
                info!("fill 완료: {}", summary);
                Ok(())
            }
            Job::Analyze { table, swapped } => commands::analyze(db, &table, swapped).await,
            Job::Swap(options) => commands::swap(db, &options).await,
            Job::Unswap(options) => commands::unswap(db, &options).await,
        }
    }
}

fn swap_options(
    table: &str,
    lock_timeout: Option<String>,
    use_view: bool,
    defaults: &Defaults,
) -> Result<SwapOptions> {
    let lock_timeout = lock_timeout.unwrap_or_else(|| defaults.lock_timeout.clone());
    Ok(SwapOptions {
        table: Table::parse(table),
        lock_timeout: parse_lock_timeout(&lock_timeout)?,
        use_view,
    })
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::new()?;
    settings.override_url(cli.url);
    settings.log_settings();

    let job = Job::from_command(cli.command, &settings.config.defaults)?;

    let client = db::pool::get_client(&settings.config.connection).await?;
    let mut db = PgDatabase::new(client, cli.dry_run);
    if cli.dry_run {
        debug!("dry-run: SQL 을 출력만 합니다");
    }

    job.run(&mut db, round_down(Utc::now(), Period::Day)).await
}
