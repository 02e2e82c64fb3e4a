//! Texture resources
//!
//! One builder per dimensionality, generic over the texel type. 1D and 2D
//! builders can also create arrays ([`TextureArray`]).

mod texture_params;
mod texture_base;
mod texture_array;
mod texture_1d;
mod texture_2d;
mod texture_3d;

pub use texture_base::{Texture, TextureBase};
pub use texture_array::{TextureArray, ArrayElement};
pub use texture_1d::{Texture1D, Texture1DArray, Texture1DBuilder};
pub use texture_2d::{Texture2D, Texture2DArray, Texture2DBuilder};
pub use texture_3d::{Texture3D, Texture3DBuilder};

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
