pub mod compare;
pub mod extract;
pub mod interop;
pub mod lifecycle;
pub mod standardize;
