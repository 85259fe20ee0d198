use datequest::{app::App, config::AppConfig, init_logging, Result};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "application error");
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    match init_logging() {
        Ok(path) => info!(log = %path.display(), "logging initialized"),
        Err(e) => eprintln!("Logging disabled: {}", e),
    }

    let config = AppConfig::load()?;
    let mut app = App::new(config)?;
    app.init()?;

    let result = app.run().await;
    app.restore()?;
    result
}
