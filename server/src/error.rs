use std::time::Duration;

use expando_cmd::CommandError;
use expando_msg::CodecError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Spawn(#[from] CommandError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("proc-macro server did not answer within {0:?}")]
    Timeout(Duration),

    #[error("proc-macro server channel is unusable after an earlier failure")]
    Broken,

    #[error("proc-macro server answered a {request} request with {response}")]
    UnexpectedResponse {
        request: &'static str,
        response: &'static str,
    },

    #[error("failed to wait for proc-macro server to exit")]
    Wait(#[source] tokio::io::Error),
}

impl ServerError {
    /// Whether the failure may have left a partial message on the channel.
    pub(crate) fn breaks_channel(&self) -> bool {
        match self {
            ServerError::Codec(CodecError::Encode(_)) => false,
            ServerError::Codec(_) | ServerError::Timeout(_) => true,
            _ => false,
        }
    }
}
