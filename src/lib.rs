//! Matching game core for young players: round generation, answer scoring,
//! star/level progression, and an adaptive difficulty model driven by
//! rolling performance statistics. The core is headless and synchronous;
//! the binary in `main.rs` is a thin terminal front-end, and all
//! randomness flows through an injected `SmallRng` so rounds are
//! reproducible under a fixed seed.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod generator;
pub mod session;
pub mod store;
