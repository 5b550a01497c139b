//! Services behind the HTTP layer
//!
//! - **Chain reader**: chain template lookup for workshop creation
//! - **Catalog**: chain and exercise reads
//! - **Workshop engine**: workshop lifecycle and transition rules
//! - **Facade**: access-checked entry points used by the routes

pub mod catalog;
pub mod chain_reader;
pub mod facade;
pub mod workshop_engine;

pub use catalog::Catalog;
pub use chain_reader::{ChainReader, StoreChainReader};
pub use facade::ServiceFacade;
pub use workshop_engine::{materialize, Advance, WorkshopEngine};
