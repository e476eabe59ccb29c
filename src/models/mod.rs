pub mod center;
pub mod document;
pub mod user;
pub mod view;

pub use center::*;
pub use user::*;
pub use view::*;
