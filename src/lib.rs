//! Breakable ice wall driven by hand gestures.
//!
//! Hand landmarks arrive in camera space through a single-slot [`hand::Mailbox`].
//! Each frame they are mapped to the canvas ([`mapper`]), classified into
//! lighter / pinch / fist-pump gestures ([`gesture`]) and applied to a wall of
//! rapier2d bricks ([`damage`], [`wall`], [`world`]). [`overlay`] and [`fx`]
//! draw the result into a software framebuffer.

pub mod config;
pub mod crack;
pub mod damage;
pub mod error;
pub mod fx;
pub mod gamma;
pub mod gesture;
pub mod hand;
pub mod mapper;
pub mod overlay;
pub mod sim;
pub mod types;
pub mod wall;
pub mod world;
