pub mod world;

pub use world::{Mayor, World};
