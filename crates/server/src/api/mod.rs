pub mod handlers;
pub mod jackett;
pub mod middleware;
pub mod routes;

pub use routes::create_router;
