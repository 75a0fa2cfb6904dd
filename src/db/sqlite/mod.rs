//! SQLite-backed repositories.

mod category;
mod connection;
mod customer;
mod exchange_rate;
mod helpers;
mod product;
mod sale;
mod store;


pub use category::{CategoryRepository, SubcategoryRepository};
pub use connection::SqliteDatabase;
pub use customer::CustomerRepository;
pub use exchange_rate::ExchangeRateRepository;
pub use product::ProductRepository;
pub use sale::SaleRepository;
pub use store::StoreRepository;
