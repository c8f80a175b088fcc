pub mod filter;
pub mod product;
pub mod taxonomy;
pub mod upload;
pub mod user;

pub use filter::*;
pub use product::*;
pub use taxonomy::*;
pub use upload::*;
pub use user::*;
