//! Dependency injection: wiring services to their I/O implementations

mod service_container;

pub use service_container::ServiceContainer;
