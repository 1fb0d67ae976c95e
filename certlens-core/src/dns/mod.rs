mod fallback;
mod resolver;

pub use fallback::resolve_fallback_targets;
pub use resolver::{AddressResolver, DnsResolver};
