use anyhow::Context;
use log::info;

use tess_example::{App, AppConfig, DEFAULT_CONFIG_PATH};

fn main() -> anyhow::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).context("Could not configure logger")?;

    #[cfg(feature = "tracing")]
    {
        use tracing_subscriber::layer::SubscriberExt;
        // log4rs owns the `log` facade, so only the tracing dispatcher is set here
        tracing::subscriber::set_global_default(
            tracing_subscriber::registry().with(tracing_tracy::TracyLayer::new()),
        )
        .context("Could not install tracy layer")?;
    }

    let config = AppConfig::load(DEFAULT_CONFIG_PATH)?;

    let app = App::new(&config).context("Failed to create App")?;

    info!("Running {}", config.window.title_prefix);
    app.run()
}
