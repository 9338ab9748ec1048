pub mod curator;
pub mod game;
pub mod menu;
pub mod practice;
