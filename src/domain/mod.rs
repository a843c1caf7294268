pub mod ai;
pub mod combat;
pub mod entity;
pub mod geom;
pub mod map;
pub mod physics;
pub mod transition;
