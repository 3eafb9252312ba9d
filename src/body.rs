//! Byte accounting for response bodies.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use http_body::{Body as HttpBody, Frame, SizeHint};
use pin_project_lite::pin_project;

pin_project! {
    /// Forwards a response body unchanged while counting the bytes streamed
    /// to the client. The count is not exported as a metric; it is emitted
    /// as a trace event once the body reaches end-of-stream.
    pub(crate) struct ObservedBody {
        #[pin]
        inner: Body,
        bytes_written: u64,
        done: bool,
    }
}

impl ObservedBody {
    pub(crate) fn new(inner: Body) -> Self {
        Self {
            inner,
            bytes_written: 0,
            done: false,
        }
    }
}

impl HttpBody for ObservedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        match this.inner.poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    *this.bytes_written += data.len() as u64;
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(None) => {
                if !*this.done {
                    *this.done = true;
                    tracing::trace!(bytes = *this.bytes_written, "response body fully written");
                }
                Poll::Ready(None)
            }
            other => other,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
