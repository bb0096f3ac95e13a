//! Infrastructure layer: repositories over in-memory and Postgres storage.
//!
//! Both stores implement the same async repository traits, so the HTTP layer
//! holds an `Arc<dyn Store>` and never knows which backend it talks to.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use repository::{
    ClientRemoval, ClientRepository, CompanyRepository, OrderRepository, ProductRepository, Store,
    UserRepository,
};
