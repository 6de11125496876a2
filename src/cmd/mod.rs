//! CLI command implementations.
//!
//! Each submodule owns one `Commands` variant:
//!
//! | Module   | Commands handled |
//! |----------|------------------|
//! | `serve`  | `Serve`          |
//! | `send`   | `Send`           |
//! | `config` | `Config`         |

pub mod config;
pub mod send;
pub mod serve;

pub use config::cmd_config;
pub use send::cmd_send;
pub use serve::cmd_serve;
