pub mod agent;
pub mod arena;
pub mod constants;
pub mod manager;
pub mod spatial;
pub mod systems;
pub mod world;
