//! Delivery of repository metrics to a Prometheus push gateway
//!
//! Each repository owns one group on the gateway, keyed by the configured job and the
//! repository name. A push first deletes the group so series that disappeared from
//! the log do not linger, then uploads the full current exposition.

mod gateway;

pub use gateway::PushGateway;
