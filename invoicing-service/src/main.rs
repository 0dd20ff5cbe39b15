use invoicing_service::config::{get_configuration, SERVICE_NAME};
use invoicing_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(SERVICE_NAME, &configuration.logging)?;

    invoicing_service::services::init_metrics();

    let application = Application::build(configuration).await?;
    application.run_until_stopped().await?;

    Ok(())
}
