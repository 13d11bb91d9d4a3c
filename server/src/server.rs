use std::path::PathBuf;
use std::pin::Pin;
use std::process::ExitStatus;
use std::time::Duration;

use expando_msg::{
    CodecError, ExpansionTask, ListMacrosTask, MessageReader, ProcMacroKind, Request, Response,
    ResponseError, write_message,
};
use expando_tree::Subtree;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tokio::process::{Child, ChildStderr};
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::{ServerConfig, ServerError};

type BoxReader = Pin<Box<dyn AsyncRead + Send>>;
type BoxWriter = Pin<Box<dyn AsyncWrite + Send>>;

/// A running expansion server.
///
/// Exchanges are single-flight: the channel lock is held from writing a
/// request until its response has been read, so concurrent callers each
/// get the response to their own request.
pub struct ProcMacroServer {
    command: String,
    child: Option<Child>,
    channel: Mutex<Channel>,
    timeout: Option<Duration>,
}

struct Channel {
    writer: BoxWriter,
    reader: MessageReader<BoxReader>,
    broken: bool,
}

impl Channel {
    async fn exchange(&mut self, request: &Request) -> Result<Response, CodecError> {
        write_message(&mut self.writer, request).await?;
        self.reader.read_message().await
    }
}

impl ProcMacroServer {
    /// Launches the server process. Must run inside a Tokio runtime.
    pub fn spawn(config: &ServerConfig) -> Result<Self, ServerError> {
        let mut command = config.command();
        let command_text = command.to_string();
        let piped = command.spawn_piped()?;
        info!(command = %command_text, pid = ?piped.child.id(), "Spawned proc-macro server");

        drain_stderr(piped.stderr, command_text.clone());

        let mut server = Self::from_io(piped.stdout, piped.stdin);
        server.command = command_text;
        server.child = Some(piped.child);
        server.timeout = config.timeout();
        Ok(server)
    }

    /// Like [`ProcMacroServer::spawn`], logging a launch failure instead of
    /// returning it.
    pub fn connect(config: &ServerConfig) -> Option<Self> {
        match Self::spawn(config) {
            Ok(server) => Some(server),
            Err(error) => {
                error!(?error, "Failed to launch proc-macro server");
                None
            }
        }
    }

    /// Talks to a server over an existing pair of streams.
    pub fn from_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + 'static,
        W: AsyncWrite + Send + 'static,
    {
        Self {
            command: "<stream>".into(),
            child: None,
            channel: Mutex::new(Channel {
                writer: Box::pin(writer),
                reader: MessageReader::new(Box::pin(reader) as BoxReader),
                broken: false,
            }),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Writes `request` and reads its response.
    ///
    /// A failure that may leave the channel out of step, such as a
    /// timeout or a truncated response, fails every later call with
    /// [`ServerError::Broken`].
    pub async fn send(&self, request: &Request) -> Result<Response, ServerError> {
        let mut channel = self.channel.lock().await;
        if channel.broken {
            return Err(ServerError::Broken);
        }

        debug!(server = %self.command, request = request_name(request), "Sending request");
        let result = match self.timeout {
            Some(limit) => match timeout(limit, channel.exchange(request)).await {
                Ok(result) => result.map_err(ServerError::from),
                Err(_) => Err(ServerError::Timeout(limit)),
            },
            None => channel.exchange(request).await.map_err(ServerError::from),
        };

        match result {
            Ok(response) => {
                debug!(server = %self.command, response = response_name(&response), "Received response");
                Ok(response)
            }
            Err(error) => {
                if error.breaks_channel() {
                    warn!(server = %self.command, %error, "Proc-macro server channel broken");
                    channel.broken = true;
                }
                Err(error)
            }
        }
    }

    /// Expands one macro call.
    ///
    /// An error reported by the server comes back as the inner `Err`.
    pub async fn expand(
        &self,
        macro_body: Subtree,
        macro_name: impl Into<String>,
        attributes: Option<Subtree>,
        lib: impl Into<PathBuf>,
    ) -> Result<Result<Subtree, ResponseError>, ServerError> {
        let request = Request::ExpansionMacro(ExpansionTask {
            macro_body,
            macro_name: macro_name.into(),
            attributes,
            lib: lib.into(),
        });

        match self.send(&request).await? {
            Response::ExpansionMacro(result) => Ok(Ok(result.expansion)),
            Response::Error(error) => Ok(Err(error)),
            response => Err(ServerError::UnexpectedResponse {
                request: request_name(&request),
                response: response_name(&response),
            }),
        }
    }

    /// Lists the macros exported by a proc-macro library.
    pub async fn list_macros(
        &self,
        lib: impl Into<PathBuf>,
    ) -> Result<Result<Vec<(String, ProcMacroKind)>, ResponseError>, ServerError> {
        let request = Request::ListMacro(ListMacrosTask { lib: lib.into() });

        match self.send(&request).await? {
            Response::ListMacro(result) => Ok(Ok(result.macros)),
            Response::Error(error) => Ok(Err(error)),
            response => Err(ServerError::UnexpectedResponse {
                request: request_name(&request),
                response: response_name(&response),
            }),
        }
    }

    /// Closes the server's stdin and waits up to `grace` for it to exit,
    /// killing it after that.
    ///
    /// Returns `None` for a server not backed by a process.
    pub async fn shutdown(self, grace: Duration) -> Result<Option<ExitStatus>, ServerError> {
        let Self {
            command,
            child,
            channel,
            ..
        } = self;
        drop(channel);

        let Some(mut child) = child else {
            return Ok(None);
        };

        let status = match timeout(grace, child.wait()).await {
            Ok(status) => status.map_err(ServerError::Wait)?,
            Err(_) => {
                warn!(server = %command, ?grace, "Proc-macro server did not exit, killing");
                child.kill().await.map_err(ServerError::Wait)?;
                child.wait().await.map_err(ServerError::Wait)?
            }
        };
        info!(server = %command, %status, "Proc-macro server exited");
        Ok(Some(status))
    }
}

fn drain_stderr(stderr: ChildStderr, command: String) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => debug!(server = %command, "stderr: {line}"),
                Ok(None) => break,
                Err(error) => {
                    debug!(server = %command, %error, "Stopped reading proc-macro server stderr");
                    break;
                }
            }
        }
    });
}

fn request_name(request: &Request) -> &'static str {
    match request {
        Request::ListMacro(_) => "ListMacro",
        Request::ExpansionMacro(_) => "ExpansionMacro",
    }
}

fn response_name(response: &Response) -> &'static str {
    match response {
        Response::Error(_) => "Error",
        Response::ListMacro(_) => "ListMacro",
        Response::ExpansionMacro(_) => "ExpansionMacro",
    }
}
