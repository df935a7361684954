pub mod encoding;
pub mod soundness;
