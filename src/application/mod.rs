/// Application layer - Use cases, services and DTOs
///
/// This layer orchestrates the compatibility engine and coordinates with
/// registries, sandboxes and the filesystem through ports.
pub mod dto;
pub mod factories;
pub mod services;
pub mod use_cases;
