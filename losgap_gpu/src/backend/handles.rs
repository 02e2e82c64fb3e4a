/// Opaque native handles
///
/// Handles are plain 64-bit values owned by the backend. Zero is reserved as the
/// `NULL` sentinel.

use std::fmt;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name(pub u64);

        impl $name {
            pub const NULL: $name = $name(0);

            pub fn is_null(&self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    write!(f, "{}(NULL)", stringify!($name))
                } else {
                    write!(f, "{}({:#x})", stringify!($name), self.0)
                }
            }
        }
    };
}

native_handle!(
    /// Native device
    DeviceHandle
);
native_handle!(
    /// Immediate or deferred device context
    DeviceContextHandle
);
native_handle!(
    /// Buffer or texture
    ResourceHandle
);
native_handle!(
    /// Shader-resource, unordered-access, render-target or depth-stencil view
    ResourceViewHandle
);
native_handle!(
    /// Command list recorded by a deferred context
    CommandListHandle
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel() {
        assert!(DeviceHandle::NULL.is_null());
        assert!(DeviceHandle::default().is_null());
        assert!(!DeviceHandle(7).is_null());
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(ResourceHandle(3), ResourceHandle(3));
        assert_ne!(ResourceHandle(3), ResourceHandle(4));
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceContextHandle::NULL.to_string(), "DeviceContextHandle(NULL)");
        assert_eq!(DeviceContextHandle(255).to_string(), "DeviceContextHandle(0xff)");
    }
}
