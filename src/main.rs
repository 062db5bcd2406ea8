mod cli;
mod color;
mod data;
mod error;
mod render;
mod stats;

use clap::Parser;

use cli::Cli;
use data::filter::filter_records;
use data::loader::load_csv;
use error::AppError;

fn main() {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = log_level_override(cli.verbose) {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).init();

    if let Err(e) = run(&cli) {
        log::error!("[{}] {}", e.code(), e);
        print_error(&e);
        std::process::exit(e.exit_code());
    }
}

/// Level forced by `--verbose`; otherwise `RUST_LOG` (default `warn`) applies.
fn log_level_override(verbose: bool) -> Option<log::LevelFilter> {
    verbose.then_some(log::LevelFilter::Debug)
}

/// Load → filter → aggregate → render, once.
fn run(cli: &Cli) -> Result<(), AppError> {
    let filter = cli.date_filter()?;
    let size = cli.image_size()?;

    let records = load_csv(&cli.input)?;
    let kept = filter_records(&records, &filter);
    render::render_to_file(&kept, filter.exclude_weekends, size, &cli.output)?;

    println!(
        "Plotted {} of {} nights to {}",
        kept.len(),
        records.len(),
        cli.output.display()
    );
    for summary in stats::summarize(&kept) {
        println!(
            "  {:<8} min {:.2}h  max {:.2}h  avg {:.2}h",
            summary.metric, summary.min, summary.max, summary.avg
        );
    }
    if let Some(hours) = stats::mean_time_in_bed_hours(&kept) {
        println!("  {:<8} avg {:.2}h", "In bed", hours);
    }
    Ok(())
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    if let Some(hint) = err.hint() {
        eprintln!();
        eprintln!("Hint: {hint}");
    }
}
