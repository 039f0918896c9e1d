pub mod client_id;
pub mod error;
pub mod manager;
pub mod platform;
pub mod store;

pub use client_id::{ClientId, derive_ephemeral, dimension_signature};
pub use error::{IdentityError, PlatformError, Result};
pub use manager::{CLIENT_ID_KEY, IdentityManager};
pub use platform::{
    HostPlatform, PlatformConstants, PlatformOs, PlatformProvider, ScreenDimensions,
    StaticPlatform,
};
pub use store::{IdentityStore, JsonFileStore, MemoryStore};
