//! `\n`-delimited framing for JSON messages.
//!
//! Decoding yields the raw bytes of each line so that a frame which is not
//! valid UTF-8 or JSON can be reported and skipped by the session instead of
//! tearing down the stream. Encoding serializes any `Serialize` value and
//! appends the delimiter.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

const DELIMITER: u8 = b'\n';

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("frame exceeds {max} bytes")]
    FrameTooLong { max: usize },
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, Default)]
pub struct JsonLinesCodec {
    /// Bytes already scanned for a delimiter in the buffered partial frame.
    next_index: usize,
    max_frame_len: Option<usize>,
}

impl JsonLinesCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_frame_len(max_frame_len: Option<usize>) -> Self {
        Self {
            next_index: 0,
            max_frame_len,
        }
    }

    fn check_len(&self, len: usize) -> Result<(), CodecError> {
        match self.max_frame_len {
            Some(max) if len > max => Err(CodecError::FrameTooLong { max }),
            _ => Ok(()),
        }
    }
}

impl Decoder for JsonLinesCodec {
    type Item = Bytes;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        let start = self.next_index.min(src.len());
        match src[start..].iter().position(|b| *b == DELIMITER) {
            Some(offset) => {
                let end = start + offset;
                self.next_index = 0;
                self.check_len(end)?;
                let mut frame = src.split_to(end + 1);
                frame.truncate(end);
                Ok(Some(frame.freeze()))
            }
            None => {
                self.check_len(src.len())?;
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, CodecError> {
        if let Some(frame) = self.decode(src)? {
            return Ok(Some(frame));
        }
        if !src.is_empty() {
            tracing::debug!(bytes = src.len(), "discarding unterminated frame at end of stream");
            src.clear();
        }
        self.next_index = 0;
        Ok(None)
    }
}

impl<T: Serialize> Encoder<T> for JsonLinesCodec {
    type Error = CodecError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), CodecError> {
        let json = serde_json::to_vec(&item)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.put_u8(DELIMITER);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lightsim_core::{LightState, Response};

    use super::*;

    fn decode_all(codec: &mut JsonLinesCodec, buf: &mut BytesMut) -> Vec<Bytes> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn decodes_multiple_frames_from_one_read() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"{\"a\":1}\n{\"b\":2}\n{\"c\""[..]);
        let frames = decode_all(&mut codec, &mut buf);
        assert_eq!(frames, vec![Bytes::from_static(b"{\"a\":1}"), Bytes::from_static(b"{\"b\":2}")]);
        assert_eq!(&buf[..], b"{\"c\"");
    }

    #[test]
    fn reassembles_frame_split_across_reads() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"{\"idx\":0,"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());

        buf.extend_from_slice(b"\"state\":{\"dim\":5}}\n");
        let frame = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(&frame[..], b"{\"idx\":0,\"state\":{\"dim\":5}}");
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_line_is_an_empty_frame() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Bytes::new()));
    }

    #[test]
    fn keeps_non_utf8_bytes() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&[0xff, 0xfe, b'\n'][..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], &[0xff, 0xfe]);
    }

    #[test]
    fn eof_discards_unterminated_tail() {
        let mut codec = JsonLinesCodec::new();
        let mut buf = BytesMut::from(&b"{\"idx\":0}\n{\"idx\""[..]);
        assert!(codec.decode_eof(&mut buf).unwrap().is_some());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn oversized_partial_frame_is_rejected() {
        let mut codec = JsonLinesCodec::with_max_frame_len(Some(8));
        let mut buf = BytesMut::from(&b"0123456789"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::FrameTooLong { max: 8 })
        ));
    }

    #[test]
    fn oversized_complete_frame_is_rejected() {
        let mut codec = JsonLinesCodec::with_max_frame_len(Some(4));
        let mut buf = BytesMut::from(&b"12345\n"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::FrameTooLong { max: 4 })
        ));
    }

    #[test]
    fn frame_at_limit_is_accepted() {
        let mut codec = JsonLinesCodec::with_max_frame_len(Some(4));
        let mut buf = BytesMut::from(&b"1234\n"[..]);
        assert_eq!(&codec.decode(&mut buf).unwrap().unwrap()[..], b"1234");
    }

    #[test]
    fn encodes_response_with_delimiter() {
        let mut codec = JsonLinesCodec::new();
        let mut dst = BytesMut::new();
        codec.encode(Response::Ok, &mut dst).unwrap();
        codec
            .encode(Response::state(LightState::default_fixture()), &mut dst)
            .unwrap();

        let text = std::str::from_utf8(&dst).unwrap();
        let lines: Vec<&str> = text.split_terminator('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"response":"ok"}"#);
        assert!(lines[1].starts_with(r#"{"response":"state","state":[{"mode":"cct""#));
        assert!(text.ends_with('\n'));
    }
}
