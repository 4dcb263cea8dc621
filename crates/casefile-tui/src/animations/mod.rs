pub mod particles;
pub mod victory;

pub use victory::VictoryScreen;
