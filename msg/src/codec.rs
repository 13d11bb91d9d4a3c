use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_CHUNK: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("failed to encode message")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode message")]
    Decode(#[source] serde_json::Error),

    #[error("message stream failed")]
    Io(#[from] tokio::io::Error),

    #[error("message stream ended before a complete message")]
    UnexpectedEof,
}

/// Writes `message` as one line of JSON and flushes.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> Result<(), CodecError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut bytes = serde_json::to_vec(message).map_err(CodecError::Encode)?;
    bytes.push(b'\n');
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads JSON values one at a time from a byte stream.
///
/// Values need not be newline terminated. Bytes past the end of a value
/// are kept for the next read.
#[derive(Debug)]
pub struct MessageReader<R> {
    reader: R,
    buffer: Vec<u8>,
    boundary: ValueBoundary,
}

/// Scan state for the end of the first top-level value in the buffer.
///
/// Each byte is scanned once, so decoding is only attempted when a value
/// may be complete.
#[derive(Debug, Default)]
struct ValueBoundary {
    scanned: usize,
    depth: usize,
    started: bool,
    in_string: bool,
    escaped: bool,
}

impl ValueBoundary {
    /// Scans bytes added since the last call. `true` once `buffer` may hold
    /// a complete value.
    fn advance(&mut self, buffer: &[u8]) -> bool {
        while let Some(&byte) = buffer.get(self.scanned) {
            self.scanned += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return true;
                    }
                }
                continue;
            }

            match byte {
                b' ' | b'\t' | b'\n' | b'\r' => {}
                b'{' | b'[' => {
                    self.started = true;
                    self.depth += 1;
                }
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return true;
                    }
                }
                b'"' => {
                    self.started = true;
                    self.in_string = true;
                }
                // Scalars have no closing byte; let the decoder decide.
                _ => {
                    self.started = true;
                    if self.depth == 0 {
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl<R> MessageReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            boundary: ValueBoundary::default(),
        }
    }

    pub async fn read_message<T: DeserializeOwned>(&mut self) -> Result<T, CodecError> {
        let mut chunk = vec![0; READ_CHUNK];
        loop {
            if self.boundary.advance(&self.buffer) {
                if let Some(message) = self.decode_buffered()? {
                    return Ok(message);
                }
            } else if !self.boundary.started {
                self.reset();
            }

            let read = self.reader.read(&mut chunk).await?;
            if read == 0 {
                return Err(CodecError::UnexpectedEof);
            }
            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.boundary = ValueBoundary::default();
    }

    /// Decodes one value from the buffer, `None` if more input is needed.
    fn decode_buffered<T: DeserializeOwned>(&mut self) -> Result<Option<T>, CodecError> {
        let (next, offset) = {
            let mut stream = serde_json::Deserializer::from_slice(&self.buffer).into_iter::<T>();
            let next = stream.next();
            (next, stream.byte_offset())
        };

        match next {
            // Only whitespace so far.
            None => {
                self.reset();
                Ok(None)
            }
            Some(Ok(message)) => {
                self.buffer.drain(..offset);
                self.boundary = ValueBoundary::default();
                Ok(Some(message))
            }
            Some(Err(error)) if error.is_eof() => Ok(None),
            Some(Err(error)) => Err(CodecError::Decode(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use expando_tree::Subtree;
    use tokio::io::{AsyncWriteExt, duplex};

    use super::*;
    use crate::{ErrorCode, Response, ResponseError};

    #[tokio::test]
    async fn write_appends_newline() {
        let mut out = Vec::new();
        write_message(&mut out, &Subtree::default()).await.unwrap();
        assert_eq!(out, b"{\"delimiter\":null,\"token_trees\":[]}\n");
    }

    #[tokio::test]
    async fn reads_value_without_trailing_newline() {
        let input: &[u8] = br#"{"delimiter":null,"token_trees":[]}"#;
        let mut reader = MessageReader::new(input);
        let subtree: Subtree = reader.read_message().await.unwrap();
        assert_eq!(subtree, Subtree::default());
    }

    #[tokio::test]
    async fn reads_consecutive_values_from_one_buffer() {
        let input: &[u8] = br#"
            {"Error":{"code":"ServerErrorEnd","message":"a"}}{"Error":{"code":"ExpansionError","message":"b"}}
        "#;
        let mut reader = MessageReader::new(input);

        let first: Response = reader.read_message().await.unwrap();
        let second: Response = reader.read_message().await.unwrap();
        assert_eq!(
            first,
            Response::Error(ResponseError {
                code: ErrorCode::ServerErrorEnd,
                message: "a".into(),
            })
        );
        assert_eq!(
            second,
            Response::Error(ResponseError {
                code: ErrorCode::ExpansionError,
                message: "b".into(),
            })
        );

        let third = reader.read_message::<Response>().await;
        assert!(matches!(third, Err(CodecError::UnexpectedEof)));
    }

    #[tokio::test]
    async fn reads_value_split_across_writes() {
        let (mut client, server) = duplex(64);
        let mut reader = MessageReader::new(server);

        let writer = tokio::spawn(async move {
            for part in [r#"{"Error":{"co"#, r#"de":"ExpansionError","#, r#""message":"boom"}}"#] {
                client.write_all(part.as_bytes()).await.unwrap();
                client.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
            client
        });

        let response: Response = reader.read_message().await.unwrap();
        assert_eq!(
            response,
            Response::Error(ResponseError {
                code: ErrorCode::ExpansionError,
                message: "boom".into(),
            })
        );
        drop(writer.await.unwrap());
    }

    #[test]
    fn boundary_ignores_brackets_in_strings() {
        let mut boundary = ValueBoundary::default();
        let mut buffer = br#"{"a":"}\"]"#.to_vec();
        assert!(!boundary.advance(&buffer));
        assert_eq!(boundary.scanned, buffer.len());

        buffer.extend_from_slice(br#"","b":[1,{}]"#);
        assert!(!boundary.advance(&buffer));

        buffer.extend_from_slice(b"} {");
        assert!(boundary.advance(&buffer));
        assert_eq!(boundary.scanned, buffer.len() - 2);
    }

    #[test]
    fn boundary_skips_leading_whitespace() {
        let mut boundary = ValueBoundary::default();
        assert!(!boundary.advance(b" \n\t "));
        assert!(!boundary.started);
    }

    #[tokio::test]
    async fn reads_large_value_in_small_pieces() {
        let (mut client, server) = duplex(256);
        let mut reader = MessageReader::new(server);

        let source = "x + 1; ".repeat(2_000);
        let subtree = expando_parse::parse_str(&source);
        let expected = subtree.clone();
        let writer = tokio::spawn(async move {
            write_message(&mut client, &subtree).await.unwrap();
            client
        });

        let decoded: Subtree = reader.read_message().await.unwrap();
        assert_eq!(decoded, expected);
        drop(writer.await.unwrap());
    }

    #[tokio::test]
    async fn truncated_value_is_unexpected_eof() {
        let input: &[u8] = br#"{"Error":{"code":"#;
        let mut reader = MessageReader::new(input);
        let result = reader.read_message::<Response>().await;
        assert!(matches!(result, Err(CodecError::UnexpectedEof)));
    }

    #[tokio::test]
    async fn malformed_value_is_decode_error() {
        let input: &[u8] = br#"{"Nope":{}}"#;
        let mut reader = MessageReader::new(input);
        let result = reader.read_message::<Response>().await;
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[tokio::test]
    async fn written_messages_read_back() {
        let (mut client, server) = duplex(64 * 1024);
        let mut reader = MessageReader::new(server);

        let subtree = expando_parse::parse_str("foo!(1.2, 'a', \"s\")");
        write_message(&mut client, &subtree).await.unwrap();
        write_message(&mut client, &subtree).await.unwrap();

        let first: Subtree = reader.read_message().await.unwrap();
        let second: Subtree = reader.read_message().await.unwrap();
        assert_eq!(first, subtree);
        assert_eq!(second, subtree);
    }
}
