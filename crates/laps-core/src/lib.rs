pub mod account;
pub mod directory;
pub mod engine;
pub mod error;
pub mod filetime;
pub mod io;
pub mod password;
pub mod paths;
pub mod settings;

pub use error::{LapsError, Result};
