//! Pack support by protocol version.

/// First protocol (1.8) able to receive resource packs at all.
pub const MIN_PACK_PROTOCOL: u32 = 47;

/// First protocol (1.20.3) able to hold several packs and remove them.
pub const MIN_STACKING_PROTOCOL: u32 = 765;

/// What the platform itself can do, independent of any client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformCapabilities {
    /// The platform can send more than one pack to a client.
    pub stacking: bool,
    /// The platform can remove packs from a client.
    pub removal: bool,
}

impl Default for PlatformCapabilities {
    fn default() -> Self {
        Self {
            stacking: true,
            removal: true,
        }
    }
}

/// What a given client can receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PackSupport {
    /// Too old for resource packs.
    Unsupported,
    /// One active pack at a time.
    Single,
    /// Several packs, layered in order, and removal.
    Stacking,
}

impl PackSupport {
    pub fn for_protocol(protocol: u32) -> Self {
        if protocol >= MIN_STACKING_PROTOCOL {
            Self::Stacking
        } else if protocol >= MIN_PACK_PROTOCOL {
            Self::Single
        } else {
            Self::Unsupported
        }
    }

    /// Cap client support at what the platform can do.
    pub fn limit(self, caps: PlatformCapabilities) -> Self {
        if self == Self::Stacking && !caps.stacking {
            Self::Single
        } else {
            self
        }
    }

    pub fn can_stack(self) -> bool {
        self == Self::Stacking
    }

    pub fn can_receive(self) -> bool {
        self != Self::Unsupported
    }
}
