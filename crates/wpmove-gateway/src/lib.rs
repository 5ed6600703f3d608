pub mod form;
pub mod render;
pub mod router;
pub mod server;
pub mod state;

pub use server::GatewayServer;
