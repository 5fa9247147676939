//! Embedding backend hook (spec.md §9 "embedding backend is specified by
//! behaviour, not library"). `fathom-learning` ships no embedder of its own
//! — it only calls one if the host wires one in.

/// Turns text into a fixed-length vector for [`fathom_vector::VectorStore`]
/// indexing. A real implementation wraps a local or hosted embedding model;
/// this crate only defines the seam.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Name recorded on the `VectorRecord` so stored vectors are traceable
    /// to the model that produced them.
    fn model_name(&self) -> &str;
}
