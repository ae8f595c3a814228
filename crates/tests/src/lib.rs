//! Integration tests for the Chanclas artifact service.
//!
//! [`mock_chain`] provides the shared test doubles: a scriptable JSON-RPC
//! transport for exercising endpoint rotation and a collection fixture
//! that materializes layer assets and rarity tables on disk.


#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod pipeline_tests;
#[cfg(test)]
mod rotation_tests;
