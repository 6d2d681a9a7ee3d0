use employer_ops::config::ProbeConfig;
use employer_ops::login_probe;
use log::warn;

#[tokio::main]
async fn main() {
    env_logger::init();
    dotenv::dotenv().ok();

    let config = ProbeConfig::from_env();
    let report = login_probe::run(&config).await;
    println!("{}", report);

    if !report.is_success() {
        warn!("Login probe against {} failed", report.url);
    }
}
