pub mod composite;
pub mod engine;
pub mod geometry;
pub mod overlay;
pub mod spec;
pub mod transitions;
