/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the outbound ports:
/// registries, caches, sandboxes, the filesystem and the console.
pub mod outbound;
