//! TCP accept loop. One task per connection; tasks share nothing.

pub mod listener;

pub use listener::Server;
