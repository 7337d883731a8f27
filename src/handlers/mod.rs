pub mod health;
pub mod register;
pub mod view;

pub use health::health_handler;
pub use register::register_handler;
pub use view::view_handler;
