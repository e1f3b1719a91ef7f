pub mod cycle;

pub use cycle::CycleService;
