//! Resource views
//!
//! A view shares its resource's native state, so a resource dropped without
//! being disposed stays allocated until its last view goes. Disposing the
//! resource is observable through [`ResourceView::resource_or_view_disposed`];
//! the view itself is still disposed by its owner.

mod resource_view;
mod shader_resource_view;
mod unordered_access_view;
mod target_views;

pub use resource_view::{ResourceView, ViewCore};
pub use shader_resource_view::ShaderResourceView;
pub use unordered_access_view::UnorderedAccessView;
pub use target_views::{RenderTargetView, DepthStencilView};

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
