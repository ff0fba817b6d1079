pub mod client;
pub mod generation;
pub mod types;

pub use generation::LeonardoImageClient;
