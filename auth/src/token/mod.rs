pub mod fingerprint;
pub mod generator;

pub use fingerprint::fingerprint;
pub use generator::TokenGenerator;
