//! Targeted rewrites, one per detected technique.
//!
//! Tree rewrites implement [`TreePass`](crate::TreePass) and report how many
//! nodes they changed. Text and oracle rewrites return the replacement text,
//! or `None` to leave the unit as it was.

mod cleanup;
mod control_flow;
mod dead_code;
mod opaque;
mod rotation;
mod strings;
mod unicode;

pub(crate) use cleanup::llm_cleanup;
pub(crate) use control_flow::unflatten_control_flow;
pub use dead_code::DeadCodeRemover;
pub use opaque::OpaquePredicateRemover;
pub use rotation::RotationRemover;
pub use strings::StringDecoder;
pub use unicode::decode_invisible_unicode;
