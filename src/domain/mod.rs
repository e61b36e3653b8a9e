pub mod climate;
pub mod user;
pub mod zone;

pub use climate::*;
pub use user::*;
pub use zone::*;
