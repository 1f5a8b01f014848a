pub mod animation;
pub mod layout;
pub mod metric;
pub mod particle;
pub mod scale;
pub mod scene;
pub mod volume;

pub use layout::Layout;
pub use metric::Metric;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("volume fixture is not valid JSON: {0}")]
    Fixture(#[from] serde_json::Error),
}
