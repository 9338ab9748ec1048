pub mod curator;
pub mod game;
pub mod geo;
pub mod layers;
pub mod models;
pub mod scoring;
pub mod viewport;
