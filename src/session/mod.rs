pub mod game;
pub mod observer;
pub mod outcome;
