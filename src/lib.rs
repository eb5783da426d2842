// src/lib.rs

// 1. Data Structures (The "Nouns")
pub mod models;

// 2. Interfaces (The "Contract")
pub mod traits;

// 3. Provider-local failures
pub mod error;

// 4. Adapters (The "Plumbing")
pub mod connectors;

// 5. The Race Coordinator (The "Orchestrator")
pub mod race;

// 6. Presentation
pub mod render;

// 7. Configuration
pub mod config;
