//! cfn-glue: typed CloudFormation bindings for `AWS::Glue::*` resources.
//!
//! Build Glue resources as Rust structs, render them into CloudFormation
//! templates, and validate, order, diff, and hash templates read back from
//! YAML or JSON.

pub mod cli;
pub mod core;
pub mod glue;
