pub mod jti;
