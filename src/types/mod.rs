#![allow(dead_code)]

mod error;
mod generation;
mod quota;
mod target;

pub use error::DataError;
pub use generation::*;
pub use quota::*;
pub use target::*;
