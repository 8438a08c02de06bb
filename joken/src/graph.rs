mod conditional;
mod constant;
mod context;
mod module;
mod register;
mod signal;
mod wire;

pub use conditional::*;
pub use constant::*;
pub use context::*;
pub use module::*;
pub use register::*;
pub use signal::*;
pub use wire::*;
