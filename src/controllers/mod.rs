pub mod rostering_controller;
