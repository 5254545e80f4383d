pub mod clips;
pub mod handlers;
pub mod middleware;
pub mod retention;
pub mod routes;

pub use routes::create_router;
