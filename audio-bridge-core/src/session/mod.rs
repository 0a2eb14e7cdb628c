pub mod bridge;
pub mod capture;
pub mod controller;
pub mod driver;
pub mod render;
