pub mod init;
pub mod outline;
pub mod paginate;
pub mod render;

pub use init::{init, InitArgs};
pub use outline::{outline, OutlineArgs};
pub use paginate::{paginate, PaginateArgs};
pub use render::{render, RenderArgs};
