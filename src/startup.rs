use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{dashboard_route, default_route},
    services::catalog_scraper::CatalogScraper,
};

pub fn run(
    listener: TcpListener,
    scraper: CatalogScraper,
    configuration: Settings,
) -> Result<Server, std::io::Error> {
    let scraper = web::Data::new(scraper);
    let configuration = web::Data::new(configuration);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(web::scope("/app").service(dashboard_route::dashboard))
            .app_data(scraper.clone())
            .app_data(configuration.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
