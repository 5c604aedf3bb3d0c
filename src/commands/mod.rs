/// Clone, classify, stage, and write the package artifacts.
pub mod build;
