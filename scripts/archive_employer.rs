use chrono::Utc;
use employer_ops::archive::{self, ArchiveService};
use employer_ops::config::ArchiveConfig;
use std::error::Error;
use log::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = ArchiveConfig::from_env();
    let pool = archive::connect(&config.database_url).await?;
    let service = ArchiveService::new(pool);

    let outcome = service.run_once(Utc::now().timestamp_millis()).await?;
    println!("{}", outcome);
    info!("Archive run finished");
    Ok(())
}
