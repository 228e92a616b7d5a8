//! Holli catalog API client
//!
//! Fetches products, zones, categories and the customer identity from the
//! Holli backend through a read-through response cache.

mod client;
mod error;
mod model;
mod request;

pub use client::CatalogClient;
pub use error::FetchError;
pub use model::{
    Category, CategoryList, Customer, CustomerList, Media, Price, Product, ProductDetail,
    ProductList, Zone, ZoneList,
};
pub use request::{CatalogRequest, ProductQuery};
