//! Decaying pointer trail that reveals one picture through another.
//!
//! A scalar field is advanced ping-pong style every frame (decay plus a soft
//! deposit along the pointer's last movement) and then used as a reveal mask
//! between two "cover"-fitted pictures.

pub mod compositor;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod images;
pub mod pointer;
pub mod types;
pub mod window;
