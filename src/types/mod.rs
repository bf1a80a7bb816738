//! All types that we are supporting

use crate::Layer;

mod macaddr;
pub use macaddr::*;

mod ethertype;
pub use ethertype::*;

mod ipaddr;
pub use ipaddr::*;

pub mod hex;

/// Creator function type
///
/// The registry maps numeric selectors to these; each creator simply builds a `default` struct
/// implementing the decoder for the Layer.
pub type LayerCreatorFn = fn() -> Box<dyn Layer + Send>;
