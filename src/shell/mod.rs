//! Command producers and result policies.
//!
//! This module provides the pieces around the result core:
//! - Local shell spawning commands and feeding their output as events
//! - Exit code and stderr checks applied to finished results
//!
//! # Example
//!
//! ```no_run
//! use shell_result::shell::{CheckPolicy, LocalShell};
//!
//! let mut shell = LocalShell::new().policy(CheckPolicy::new(true, false));
//! shell.set_var("GREETING", "hello");
//!
//! let mut result = shell.run("echo $GREETING").unwrap();
//! assert!(result.eq_text("hello").unwrap());
//!
//! // Follow output live instead
//! let mut live = shell.spawn("for i in 1 2 3; do echo $i; sleep 1; done").unwrap();
//! for line in live.iter_stdout() {
//!     println!("{}", line.unwrap());
//! }
//! ```

mod local;
mod policy;

pub use local::{LocalShell, DEFAULT_SHELL};
pub use policy::CheckPolicy;
