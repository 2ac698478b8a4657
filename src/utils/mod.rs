pub mod linear_heap;
pub mod signal_handling;
pub mod vertex_set;

pub use linear_heap::LinearHeap;
pub use vertex_set::ReversibleVertexSet;
