pub mod token_buf;

pub use token_buf::TokenBuf;
