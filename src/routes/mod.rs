pub mod dashboard_route;
pub mod default_route;
