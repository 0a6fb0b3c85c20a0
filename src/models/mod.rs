pub mod badge;
pub mod cycle;
pub mod stencil;
pub mod tension;
pub mod user;
