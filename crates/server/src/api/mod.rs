pub mod cart;
pub mod catalog;
pub mod handlers;
pub mod middleware;
pub mod products;
pub mod queue;
pub mod routes;

pub use routes::create_router;
