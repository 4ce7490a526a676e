pub mod access_token;
pub mod random;

pub use access_token::AccessTokenSettings;
pub use access_token::JwtAccessTokenCodec;
pub use random::OsRandomTokenSource;
