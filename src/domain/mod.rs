pub mod auth;
pub mod results;
pub mod step;

pub use auth::*;
pub use results::*;
pub use step::*;
