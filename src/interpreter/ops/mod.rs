pub mod access;
pub mod assign;
pub mod binary;
pub mod compare;
pub mod unary;

// Entry points that may run guest code are `impl Interpreter`;
// the rest are free functions over values
