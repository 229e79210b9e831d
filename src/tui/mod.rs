// Terminal rendition of the command form
pub mod app;
pub mod events;
pub mod rendering;
pub mod types;
pub mod widgets;

#[cfg(test)]
mod tests;

pub use rendering::run_tui;
