pub mod material;
pub mod recommendation;
