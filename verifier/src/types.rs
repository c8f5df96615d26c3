//! # Verifier Types

mod definition;
mod request;
mod result;
mod verification;

pub use self::definition::*;
pub use self::request::*;
pub use self::result::*;
pub use self::verification::*;
