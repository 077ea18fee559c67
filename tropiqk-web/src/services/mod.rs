pub mod api;
pub mod bootstrap;
pub mod feedback;
pub mod interceptor;
pub mod metrics;
pub mod navigation;
pub mod profile;
pub mod route_guard;
pub mod session;
pub mod transport;
