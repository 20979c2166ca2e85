pub mod naming;
pub mod resize;
pub mod variants;
