pub mod achievements;
pub mod adaptive;
pub mod scoring;
