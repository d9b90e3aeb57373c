pub mod awareness;
pub mod combat;
pub mod fsm;
pub mod perception;
pub mod stats;
pub mod steering;
