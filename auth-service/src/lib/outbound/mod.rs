pub mod clock;
pub mod email;
pub mod repositories;
pub mod tokens;
