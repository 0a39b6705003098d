use actix_web::{get, web, HttpResponse};
use askama::Template;
use serde::Deserialize;

use crate::{
    configuration::Settings,
    domain::product::ProductRecord,
    services::{
        catalog_scraper::CatalogScraper,
        data_persistance::{load_dataset, save_dataset},
    },
};

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    rows: Vec<DisplayRow>,
    banner: Banner,
    average_price: Option<String>,
    price_bars: Vec<PriceBar>,
    default_pages: u32,
}

struct DisplayRow {
    title: String,
    price: String,
    rating: String,
}

/// One entry of the top-priced products bar list.
struct PriceBar {
    title: String,
    label: String,
    percent: u32,
}

enum Banner {
    Quiet,
    Scraped(usize),
    NoData,
    Failed(String),
}

#[derive(Deserialize)]
struct DashboardQuery {
    pages: Option<u32>,
    refresh: Option<bool>,
}

#[get("/dashboard")]
async fn dashboard(
    scraper: web::Data<CatalogScraper>,
    settings: web::Data<Settings>,
    query: web::Query<DashboardQuery>,
) -> HttpResponse {
    let pages = query
        .pages
        .unwrap_or(settings.scraper.default_pages)
        .clamp(1, 5);
    let data_file = &settings.scraper.data_file;

    let mut banner = Banner::Quiet;
    if query.refresh.unwrap_or(false) || !std::path::Path::new(data_file).exists() {
        match scraper.collect(pages).await {
            Ok(records) if records.is_empty() => banner = Banner::NoData,
            Ok(records) => match save_dataset(data_file, &records) {
                Ok(()) => banner = Banner::Scraped(records.len()),
                Err(e) => {
                    log::error!("Failed to save dataset: {:?}", e);
                    banner = Banner::Failed(e.to_string());
                }
            },
            // A failed run persists nothing; the table below keeps showing
            // whatever the last successful run saved.
            Err(e) => {
                log::error!("Scraping failed: {}", e);
                banner = Banner::Failed(e.to_string());
            }
        }
    }

    let records = load_dataset(data_file).unwrap_or_default();
    let average_price = average_price(&records).map(|avg| format!("${:.2}", avg));
    let price_bars = top_priced(&records, 10);
    let rows = records
        .into_iter()
        .map(|record| DisplayRow {
            title: record.title.unwrap_or_default(),
            price: record.price.unwrap_or_default(),
            rating: record.rating.unwrap_or_default(),
        })
        .collect();

    HttpResponse::Ok().body(
        DashboardTemplate {
            rows,
            banner,
            average_price,
            price_bars,
            default_pages: settings.scraper.default_pages,
        }
        .render()
        .unwrap(),
    )
}

/// Strip currency formatting down to digits and the decimal point.
fn clean_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// The `limit` highest-priced products, widths scaled against the most
/// expensive one. Records without a title or a parseable price are skipped.
fn top_priced(records: &[ProductRecord], limit: usize) -> Vec<PriceBar> {
    let mut priced: Vec<(String, f64)> = records
        .iter()
        .filter_map(|record| {
            let title = record.title.as_deref()?;
            let price = clean_price(record.price.as_deref()?)?;
            Some((title.to_string(), price))
        })
        .collect();
    priced.sort_by(|a, b| b.1.total_cmp(&a.1));
    priced.truncate(limit);

    let top = priced.first().map(|(_, price)| *price).unwrap_or(0.0);
    priced
        .into_iter()
        .map(|(title, price)| PriceBar {
            title,
            label: format!("${:.2}", price),
            percent: match top > 0.0 {
                true => ((price / top) * 100.0).round() as u32,
                false => 0,
            },
        })
        .collect()
}

fn average_price(records: &[ProductRecord]) -> Option<f64> {
    let prices: Vec<f64> = records
        .iter()
        .filter_map(|record| record.price.as_deref())
        .filter_map(clean_price)
        .collect();

    match prices.is_empty() {
        true => None,
        false => Some(prices.iter().sum::<f64>() / prices.len() as f64),
    }
}
