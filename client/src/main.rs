use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use jolokia_client::constants::defaults;
use jolokia_client::{ConfigManager, JobCallback, Jolokia, Scheduler, SimpleOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("jolokia_client=info".parse()?)
        .add_directive("jolokia_poller=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    let config_dir = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(defaults::CONFIG_DIR_ENV).ok())
        .unwrap_or_else(|| defaults::CONFIG_DIR.to_string());

    info!("Starting Jolokia poller with config from {}", config_dir);

    let config_manager = ConfigManager::new(config_dir).await?;
    let config = config_manager.get_current_config();

    let client = Jolokia::from_config(&config)?;

    match client.version(SimpleOptions::default()).await? {
        Some(version) => info!(
            "Connected to agent {} (protocol {}) at {}",
            version.agent, version.protocol, config.url
        ),
        None => warn!("Agent at {} did not report its version", config.url),
    }

    let scheduler = Scheduler::new(client);
    for job in &config.jobs {
        let success_name = job.name.clone();
        let error_name = job.name.clone();
        let callback = JobCallback::handlers(
            move |response| {
                info!(
                    job = %success_name,
                    mbean = response.request.mbean().unwrap_or("-"),
                    "{}",
                    response.value
                );
            },
            move |failed| {
                warn!(job = %error_name, "{}", failed);
            },
        );

        match scheduler.register_with_params(callback, job.requests.clone(), job.params.clone()) {
            Ok(handle) => info!("Registered job {} as #{}", job.name, handle),
            Err(e) => error!("Failed to register job {}: {}", job.name, e),
        }
    }

    if scheduler.jobs().is_empty() {
        warn!("No polling jobs configured, nothing to do");
        return Ok(());
    }

    scheduler.poll_once().await;
    scheduler.start(config.poll_period());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    scheduler.stop();

    Ok(())
}
