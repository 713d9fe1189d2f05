mod config;
mod data;
mod pipeline;

use config::PipelineConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let config = PipelineConfig::default();
    let summary = pipeline::run(&config)?;

    log::debug!(
        "done: {} source trips, {} airport trips, {} training rows, {} test slices",
        summary.source_rows,
        summary.airport_rows,
        summary.train_rows,
        summary.test_rows.len()
    );
    Ok(())
}
