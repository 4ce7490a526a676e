use auth::TokenGenerator;

use crate::domain::auth::ports::RandomTokenSource;

/// Opaque token values drawn from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomTokenSource {
    generator: TokenGenerator,
}

impl OsRandomTokenSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomTokenSource for OsRandomTokenSource {
    fn generate(&self) -> String {
        self.generator.generate()
    }
}
