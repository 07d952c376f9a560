use futures::stream::{self, BoxStream, StreamExt};
use std::io;

/// A capture source that yields `items` and then ends.
pub fn immediate_source<I>(items: I) -> BoxStream<'static, io::Result<Vec<u8>>>
where
    I: IntoIterator<Item = io::Result<Vec<u8>>>,
    I::IntoIter: Send + 'static,
{
    stream::iter(items).boxed()
}

/// A capture source that yields `frames` and then waits forever, like an idle interface.
pub fn idle_after<I>(frames: I) -> BoxStream<'static, io::Result<Vec<u8>>>
where
    I: IntoIterator<Item = Vec<u8>>,
    I::IntoIter: Send + 'static,
{
    stream::iter(frames)
        .map(Ok)
        .chain(stream::pending())
        .boxed()
}

/// Wraps frames as successful reads.
pub fn ok_frames<I>(frames: I) -> Vec<io::Result<Vec<u8>>>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    frames.into_iter().map(Ok).collect()
}
