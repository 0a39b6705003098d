pub mod catalog_scraper;
pub mod data_persistance;
pub mod extractor;

pub use catalog_scraper::*;
pub use data_persistance::*;
pub use extractor::*;
