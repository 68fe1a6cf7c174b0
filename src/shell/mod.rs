//! Delegated command execution: child process lifecycle, incremental output
//! decoding, and the sudo escalation flow.

mod decode;
mod process;
mod sudo;

pub use decode::StreamDecoder;
pub use process::{ProcessHandle, ProcessManager, interactive_shell};
pub use sudo::{Escalation, SudoGate};
