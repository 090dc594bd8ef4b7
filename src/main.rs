use std::io;

use reward_reveal::config::RevealSettings;
use reward_reveal::demo::DemoCase;
use reward_reveal::render::{JsonLinesSurface, RenderOptions, drive_surface};
use reward_reveal::reveal::{PhaseController, RevealStage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the frames.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let case: DemoCase = match std::env::args().nth(1) {
        Some(arg) => arg.parse().map_err(anyhow::Error::msg)?,
        None => DemoCase::default(),
    };

    let settings = RevealSettings::from_env()?;

    eprintln!("🎁 Reward Reveal v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Case: {}", case);
    eprintln!("   Time scale: {}", settings.time_scale);
    eprintln!("   Particles: {}\n", settings.particle_count);

    let options = RenderOptions::from_settings(&settings);
    let mut stage = RevealStage::new(PhaseController::new(settings));

    let config = case
        .config()
        .on_complete(|| tracing::info!("Animation complete"));
    let run = stage.replay(config);

    let mut surface = JsonLinesSurface::new(io::stdout().lock());
    let status = drive_surface(run, &options, &mut surface).await?;

    tracing::info!(
        status = %status,
        elapsed_ms = run.elapsed().as_millis() as u64,
        "Reveal finished"
    );

    Ok(())
}
