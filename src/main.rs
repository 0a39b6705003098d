use std::net::TcpListener;

use env_logger::Env;
use supptrends::{
    configuration::get_configuration,
    services::{catalog_scraper::CatalogScraper, data_persistance::save_dataset},
    startup::run,
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().expect("Failed to read configuration.");
    let scraper =
        CatalogScraper::new(&configuration.scraper).expect("Invalid base_url in configuration.");

    // Scrape fresh data on startup so the dashboard has something to show.
    log::info!("Scraping fresh data on startup, please wait...");
    match scraper.collect(configuration.scraper.default_pages).await {
        Ok(records) if records.is_empty() => {
            log::warn!("Scraping returned no products");
        }
        Ok(records) => match save_dataset(&configuration.scraper.data_file, &records) {
            Ok(()) => log::info!(
                "Scraped {} products and saved to {}",
                records.len(),
                configuration.scraper.data_file
            ),
            Err(e) => log::error!("Failed to save dataset: {:?}", e),
        },
        Err(e) => log::error!("Scraping failed: {}", e),
    }

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(address)?;

    run(listener, scraper, configuration)?.await
}
