//! # What are they for?
//!
//! Classifiers take each captured frame by reference, are not able to modify it, and return a
//! class that tells the capture loop what to do with the frame. They are pure: the same bytes
//! always give the same class.
mod who_has;
pub use self::who_has::*;

/// Used by the capture loop to determine the kind of frame we have.
pub trait Classifier {
    type Packet: ?Sized;
    type Class: Sized;

    fn classify(&self, packet: &Self::Packet) -> Self::Class;
}
