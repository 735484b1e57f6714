//! Crustadf provides the building blocks of SAT-based reasoners for Abstract Dialectical Frameworks:
//! three-valued interpretations, incremental SAT sessions over named atoms, and a pool of prepared solver instances.

#![warn(missing_docs)]

pub mod adf;

pub mod interpretation;

pub mod pool;

pub mod sat;
