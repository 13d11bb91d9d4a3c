//! Request and response envelopes spoken with a proc-macro expansion
//! server, and the framing used to move them over a byte stream.

mod codec;
mod message;

pub use crate::codec::{CodecError, MessageReader, write_message};
pub use crate::message::{
    ErrorCode, ExpansionResult, ExpansionTask, ListMacrosResult, ListMacrosTask, ProcMacroKind,
    Request, Response, ResponseError,
};
