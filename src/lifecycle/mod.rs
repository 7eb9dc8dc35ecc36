//! Service lifecycle: starting and stopping services, and the manager
//! operations on tables, check-ins and patrons inside a running service.

mod service;

pub use service::ServiceLifecycleService;
