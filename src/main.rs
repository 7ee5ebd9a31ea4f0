use swarms_signup::configuration::get_configuration;
use swarms_signup::startup::Application;
use swarms_signup::telemetry::get_subscriber;
use swarms_signup::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("swarms-signup", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;
    let app = Application::build(cfg).await?;
    tracing::info!(port = app.get_port(), "Listening");
    app.run_until_stopped().await?;
    Ok(())
}
