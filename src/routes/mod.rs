pub mod rostering_routes;
