mod engine_factory;
mod presenter_factory;

pub use engine_factory::EngineFactory;
pub use presenter_factory::{PresenterFactory, PresenterType};
